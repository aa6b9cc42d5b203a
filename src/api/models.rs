use serde::Deserialize;
use crate::errors::GatewayError;
use crate::llm::{ChatTurn, CompletionRequest, GenerationParameters};
use crate::moderation::Direction;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub prompt: String,
    #[serde(alias = "providerId")]
    pub provider: String,
    pub model: Option<String>,
    #[serde(default)]
    pub parameters: GenerationParameters,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

impl ChatRequest {
    /// Unknown providers fail here, before anything else happens.
    pub fn into_completion_request(self) -> Result<CompletionRequest, GatewayError> {
        let provider = self.provider.parse()?;
        Ok(CompletionRequest::new(provider, &self.prompt)?
            .with_model(self.model.as_deref())
            .with_parameters(self.parameters)
            .with_history(self.conversation_history))
    }
}

#[derive(Debug, Deserialize)]
pub struct ModerateRequest {
    pub text: String,
    #[serde(default = "default_direction")]
    pub direction: Direction,
}

fn default_direction() -> Direction {
    Direction::Input
}
