use std::path::Path;
use crate::errors::GatewayError;
use crate::llm::types::ProviderId;
use super::credentials::resolve_credential;
use super::types::GatewayConfig;
use super::schema::CONFIG_SCHEMA;
use tracing::{debug, warn};

/// Load the gateway configuration: optional YAML file, then the process
/// environment on top.
pub async fn load_config(path: Option<&Path>) -> Result<GatewayConfig, GatewayError> {
    let mut config = match path {
        Some(path) => parse_config(path).await?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;
    Ok(config)
}

pub async fn parse_config(path: &Path) -> Result<GatewayConfig, GatewayError> {
    if !path.exists() {
        return Err(GatewayError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(GatewayError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<GatewayConfig, GatewayError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;
    if yaml.is_null() {
        return Ok(GatewayConfig::default());
    }

    // JSON Schema validation
    validate_schema(&yaml)?;

    let mut config: GatewayConfig = serde_yaml::from_value(yaml)?;
    for id in ProviderId::ALL {
        let provider = config.providers.get_mut(*id);
        if let Some(key) = provider.api_key.as_deref() {
            provider.api_key = Some(resolve_credential(key));
        }
    }

    validate_config(&config)?;
    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// Per provider: `{PREFIX}_API_KEY`, `{PREFIX}_BASE_URL`, `{PREFIX}_MODEL`,
/// `{PREFIX}_TIMEOUT_SECS`. Google also accepts `GEMINI_API_KEY`.
/// Gateway-wide: `GUARDRAILS_ENABLED`, `GUARDGATE_HOST`, `GUARDGATE_PORT`,
/// `GUARDGATE_API_TOKEN`.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    for id in ProviderId::ALL {
        let prefix = id.env_prefix();
        let provider = config.providers.get_mut(*id);

        let key = non_empty(&format!("{}_API_KEY", prefix)).or_else(|| match id {
            ProviderId::Google => non_empty("GEMINI_API_KEY"),
            _ => None,
        });
        if let Some(key) = key {
            debug!(provider = %id, "API key taken from environment");
            provider.api_key = Some(key);
        }
        if let Some(url) = non_empty(&format!("{}_BASE_URL", prefix)) {
            provider.base_url = Some(url);
        }
        if let Some(model) = non_empty(&format!("{}_MODEL", prefix)) {
            provider.model = Some(model);
        }
        if let Some(raw) = non_empty(&format!("{}_TIMEOUT_SECS", prefix)) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => provider.timeout_secs = Some(secs),
                Err(_) => warn!(provider = %id, value = %raw, "Ignoring invalid timeout"),
            }
        }
    }

    if let Some(raw) = non_empty("GUARDRAILS_ENABLED") {
        match parse_bool(&raw) {
            Some(enabled) => config.guardrails.enabled = enabled,
            None => warn!(value = %raw, "Ignoring invalid GUARDRAILS_ENABLED"),
        }
    }
    if let Some(host) = non_empty("GUARDGATE_HOST") {
        config.server.host = host;
    }
    if let Some(raw) = non_empty("GUARDGATE_PORT") {
        match raw.trim().parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %raw, "Ignoring invalid GUARDGATE_PORT"),
        }
    }
    if let Some(token) = non_empty("GUARDGATE_API_TOKEN") {
        config.server.api_token = Some(token);
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), GatewayError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| GatewayError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| GatewayError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        // Advisory only: serde decides what is actually accepted
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Reject settings that would only fail later at request time.
pub fn validate_config(config: &GatewayConfig) -> Result<(), GatewayError> {
    for id in ProviderId::ALL {
        let provider = config.providers.get(*id);
        if let Some(url) = provider.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(GatewayError::Config(format!(
                    "Invalid base_url for {}: '{}' must start with http:// or https://",
                    id, url
                )));
            }
        }
        if provider.timeout_secs == Some(0) {
            return Err(GatewayError::Config(format!("timeout_secs for {} must be at least 1", id)));
        }
    }

    if config.server.port == 0 {
        return Err(GatewayError::Config("server.port must be non-zero".into()));
    }

    Ok(())
}
