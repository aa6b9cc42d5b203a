use serde::{Deserialize, Serialize};
use crate::errors::GatewayError;
use crate::moderation::{Category, ModerationVerdict};

/// Supported upstream providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    #[serde(alias = "openai-compatible")]
    OpenAI,
    #[serde(alias = "claude")]
    Anthropic,
    Groq,
    #[serde(alias = "gemini")]
    Google,
}

impl ProviderId {
    pub const ALL: &'static [ProviderId] = &[
        ProviderId::OpenAI,
        ProviderId::Anthropic,
        ProviderId::Groq,
        ProviderId::Google,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Groq => "groq",
            Self::Google => "google",
        }
    }

    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI",
            Self::Anthropic => "ANTHROPIC",
            Self::Groq => "GROQ",
            Self::Google => "GOOGLE",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "openai-compatible" | "openai_compatible" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "groq" => Ok(Self::Groq),
            "google" | "gemini" => Ok(Self::Google),
            other => Err(GatewayError::Config(format!("Unknown LLM provider: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: &str) -> Self {
        Self { role: Role::System, content: content.to_string() }
    }
    pub fn user(content: &str) -> Self {
        Self { role: Role::User, content: content.to_string() }
    }
    pub fn assistant(content: &str) -> Self {
        Self { role: Role::Assistant, content: content.to_string() }
    }
}

/// Sampling parameters. Absent values fall back to each provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParameters {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

/// Provider-neutral completion request. Fields are private so a request
/// cannot change after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    prompt: String,
    provider: ProviderId,
    model: Option<String>,
    parameters: GenerationParameters,
    history: Vec<ChatTurn>,
}

impl CompletionRequest {
    pub fn new(provider: ProviderId, prompt: &str) -> Result<Self, GatewayError> {
        if prompt.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(Self {
            prompt: prompt.to_string(),
            provider,
            model: None,
            parameters: GenerationParameters::default(),
            history: Vec::new(),
        })
    }

    /// Override the adapter's default model. Blank names are ignored.
    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(str::trim).filter(|m| !m.is_empty()).map(str::to_string);
        self
    }

    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }

    pub fn prompt(&self) -> &str { &self.prompt }
    pub fn provider(&self) -> ProviderId { self.provider }
    pub fn model(&self) -> Option<&str> { self.model.as_deref() }
    pub fn parameters(&self) -> &GenerationParameters { &self.parameters }
    pub fn history(&self) -> &[ChatTurn] { &self.history }

    /// System turns from the history joined into one instruction block.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .history
            .iter()
            .filter(|t| t.role == Role::System)
            .map(|t| t.content.as_str())
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }

    /// Non-system history followed by the prompt as the final user turn.
    pub fn dialogue(&self) -> Vec<ChatTurn> {
        self.history
            .iter()
            .filter(|t| t.role != Role::System)
            .cloned()
            .chain(std::iter::once(ChatTurn::user(&self.prompt)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

impl Usage {
    pub fn new(input_tokens: Option<u64>, output_tokens: Option<u64>) -> Option<Self> {
        if input_tokens.is_none() && output_tokens.is_none() {
            return None;
        }
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(i), Some(o)) => i.checked_add(o),
            _ => None,
        };
        Some(Self { input_tokens, output_tokens, total_tokens })
    }
}

/// Normalized completion handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub content: String,
    pub usage: Option<Usage>,
    pub finish_reason: String,
    /// True iff `content` was replaced by a safe response.
    pub moderated: bool,
    pub provider: ProviderId,
    pub model: String,
    /// Provider output kept for audit when `moderated` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
    /// Response verdict when `moderated` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moderation: Option<ModerationVerdict>,
}

impl CompletionResult {
    pub fn new(provider: ProviderId, model: &str, content: String, finish_reason: Option<&str>, usage: Option<Usage>) -> Self {
        Self {
            content,
            usage,
            finish_reason: finish_reason
                .filter(|r| !r.is_empty())
                .map(str::to_lowercase)
                .unwrap_or_else(|| "unknown".to_string()),
            moderated: false,
            provider,
            model: model.to_string(),
            original_content: None,
            moderation: None,
        }
    }
}

/// One unit of a streamed completion.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Content(String),
    Error {
        message: String,
        /// Set when the stream was rejected by input moderation.
        category: Option<Category>,
    },
    Done,
}

impl StreamChunk {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into(), category: None }
    }
}
