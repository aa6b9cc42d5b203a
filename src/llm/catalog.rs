use super::types::ProviderId;

pub struct ProviderInfo {
    pub id: ProviderId,
    pub name: &'static str,
    pub base_url: &'static str,
    pub default_model: &'static str,
    pub env_var: &'static str,
    /// Whether the upstream protocol is used for incremental delivery.
    pub native_streaming: bool,
}

static OPENAI: ProviderInfo = ProviderInfo {
    id: ProviderId::OpenAI,
    name: "OpenAI-compatible",
    base_url: "https://api.openai.com/v1",
    default_model: "gpt-4o-mini",
    env_var: "OPENAI_API_KEY",
    native_streaming: true,
};

static ANTHROPIC: ProviderInfo = ProviderInfo {
    id: ProviderId::Anthropic,
    name: "Anthropic",
    base_url: "https://api.anthropic.com",
    default_model: "claude-sonnet-4-5-20250929",
    env_var: "ANTHROPIC_API_KEY",
    native_streaming: true,
};

static GROQ: ProviderInfo = ProviderInfo {
    id: ProviderId::Groq,
    name: "Groq",
    base_url: "https://api.groq.com/openai/v1",
    default_model: "llama-3.3-70b-versatile",
    env_var: "GROQ_API_KEY",
    native_streaming: true,
};

static GOOGLE: ProviderInfo = ProviderInfo {
    id: ProviderId::Google,
    name: "Google Gemini",
    base_url: "https://generativelanguage.googleapis.com/v1beta",
    default_model: "gemini-2.5-flash",
    env_var: "GOOGLE_API_KEY",
    native_streaming: false,
};

pub static PROVIDERS: &[&ProviderInfo] = &[&OPENAI, &ANTHROPIC, &GROQ, &GOOGLE];

pub fn provider_info(id: ProviderId) -> &'static ProviderInfo {
    match id {
        ProviderId::OpenAI => &OPENAI,
        ProviderId::Anthropic => &ANTHROPIC,
        ProviderId::Groq => &GROQ,
        ProviderId::Google => &GOOGLE,
    }
}

pub fn get_default_model(id: ProviderId) -> &'static str {
    provider_info(id).default_model
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_provider() {
        for id in ProviderId::ALL {
            assert_eq!(provider_info(*id).id, *id);
        }
        assert_eq!(PROVIDERS.len(), ProviderId::ALL.len());
    }

    #[test]
    fn test_only_google_falls_back_to_single_chunk() {
        let fallbacks: Vec<ProviderId> = PROVIDERS
            .iter()
            .filter(|p| !p.native_streaming)
            .map(|p| p.id)
            .collect();
        assert_eq!(fallbacks, vec![ProviderId::Google]);
    }
}
