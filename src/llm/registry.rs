use std::collections::HashMap;
use std::sync::Arc;
use crate::config::credentials::mask_secret;
use crate::config::{GatewayConfig, ResolvedProviderConfig};
use crate::errors::GatewayError;
use super::anthropic::AnthropicProvider;
use super::catalog;
use super::gemini::GeminiProvider;
use super::groq::GroqProvider;
use super::openai::OpenAIProvider;
use super::provider::ProviderAdapter;
use super::types::ProviderId;
use tracing::{debug, info};

/// Build the adapter for one provider. Fails when no credential is
/// configured. Never touches the network.
pub fn create_adapter(config: &ResolvedProviderConfig) -> Result<Arc<dyn ProviderAdapter>, GatewayError> {
    if !config.available {
        let info = catalog::provider_info(config.provider);
        return Err(GatewayError::Config(format!(
            "No API key configured for {} (set {})",
            info.name, info.env_var
        )));
    }

    let adapter: Arc<dyn ProviderAdapter> = match config.provider {
        ProviderId::OpenAI => Arc::new(OpenAIProvider::new(config)?),
        ProviderId::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        ProviderId::Groq => Arc::new(GroqProvider::new(config)?),
        ProviderId::Google => Arc::new(GeminiProvider::new(config)?),
    };
    Ok(adapter)
}

/// Provider id to adapter mapping, filled once at startup and read-only
/// afterwards.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderId, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One adapter per provider that has a credential. Providers without one
    /// stay unregistered and resolve to a configuration error.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut registry = Self::empty();
        for id in ProviderId::ALL {
            let resolved = config.provider_config(*id);
            if !resolved.available {
                debug!(provider = %id, "Provider not configured, skipping");
                continue;
            }
            registry.register(create_adapter(&resolved)?);
            info!(
                provider = %id,
                model = %resolved.model,
                key = %mask_secret(&resolved.api_key),
                "Provider registered"
            );
        }
        Ok(registry)
    }

    /// Bind an adapter to its provider id, replacing any earlier binding.
    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        self.adapters.insert(adapter.provider_id(), adapter);
    }

    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn resolve(&self, provider: ProviderId) -> Result<Arc<dyn ProviderAdapter>, GatewayError> {
        self.adapters.get(&provider).cloned().ok_or_else(|| {
            let info = catalog::provider_info(provider);
            GatewayError::Config(format!(
                "Provider {} is not available: no API key configured (set {})",
                provider, info.env_var
            ))
        })
    }

    pub fn is_available(&self, provider: ProviderId) -> bool {
        self.adapters.contains_key(&provider)
    }

    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .iter()
            .copied()
            .filter(|id| self.adapters.contains_key(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(id: ProviderId, key: &str) -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.providers.get_mut(id).api_key = Some(key.to_string());
        config
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        match "mistral".parse::<ProviderId>() {
            Err(GatewayError::Config(msg)) => assert!(msg.contains("mistral")),
            _ => panic!("expected configuration error"),
        }
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let config = GatewayConfig::default();
        let err = create_adapter(&config.provider_config(ProviderId::Groq));
        assert!(matches!(err, Err(GatewayError::Config(_))));

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert!(registry.providers().is_empty());
        assert!(matches!(registry.resolve(ProviderId::Groq), Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_from_config_registers_configured_providers() {
        let mut config = config_with(ProviderId::Anthropic, "sk-ant-test");
        config.providers.google.api_key = Some("AIza-test".into());

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.providers(), vec![ProviderId::Anthropic, ProviderId::Google]);

        let adapter = registry.resolve("gemini".parse().unwrap()).unwrap();
        assert_eq!(adapter.provider_id(), ProviderId::Google);
        assert_eq!(adapter.model_name(), catalog::get_default_model(ProviderId::Google));
        assert!(!registry.is_available(ProviderId::OpenAI));
    }

    #[test]
    fn test_resolve_returns_same_instance() {
        let registry = ProviderRegistry::from_config(&config_with(ProviderId::OpenAI, "sk-test")).unwrap();
        let a = registry.resolve(ProviderId::OpenAI).unwrap();
        let b = registry.resolve(ProviderId::OpenAI).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
