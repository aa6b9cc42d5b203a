use std::collections::HashMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::llm::catalog;
use crate::llm::types::ProviderId;
use crate::moderation::Category;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub guardrails: GuardrailsConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token clients must present. Unset leaves the API open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 3000, api_token: None }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardrailsConfig {
    pub enabled: bool,
    /// Extra trigger patterns for the input classifier, per category.
    pub input_patterns: HashMap<Category, Vec<String>>,
    /// Extra trigger patterns for the response classifier, per category.
    pub response_patterns: HashMap<Category, Vec<String>>,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            input_patterns: HashMap::new(),
            response_patterns: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
    pub anthropic: ProviderConfig,
    pub groq: ProviderConfig,
    pub google: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, id: ProviderId) -> &ProviderConfig {
        match id {
            ProviderId::OpenAI => &self.openai,
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::Groq => &self.groq,
            ProviderId::Google => &self.google,
        }
    }

    pub fn get_mut(&mut self, id: ProviderId) -> &mut ProviderConfig {
        match id {
            ProviderId::OpenAI => &mut self.openai,
            ProviderId::Anthropic => &mut self.anthropic,
            ProviderId::Groq => &mut self.groq,
            ProviderId::Google => &mut self.google,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Per-provider settings with catalog defaults filled in.
#[derive(Debug, Clone)]
pub struct ResolvedProviderConfig {
    pub provider: ProviderId,
    pub available: bool,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Resolved view of one provider. `available` is true iff a non-empty
    /// credential is configured.
    pub fn provider_config(&self, id: ProviderId) -> ResolvedProviderConfig {
        let raw = self.providers.get(id);
        let info = catalog::provider_info(id);
        let api_key = raw.api_key.clone().unwrap_or_default();

        ResolvedProviderConfig {
            provider: id,
            available: !api_key.trim().is_empty(),
            api_key,
            base_url: raw
                .base_url
                .clone()
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| info.base_url.to_string()),
            model: raw
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| info.default_model.to_string()),
            timeout: Duration::from_secs(raw.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}
