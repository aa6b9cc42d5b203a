//! Deterministic safe-response substitution.

use super::category::{Category, Direction};
use super::verdict::ModerationVerdict;

pub const PROMPT_INJECTION_MESSAGE: &str = "I can't follow instructions that try to override my guidelines or reveal my system configuration. Please rephrase your request.";
pub const JAILBREAK_MESSAGE: &str = "I can't switch into an unrestricted mode or set aside my safety guidelines, but I'm happy to help with your request within them.";
pub const HARMFUL_CONTENT_MESSAGE: &str = "I can't help with requests that could cause harm to people. If you have a different question, I'm glad to help.";
pub const HARMFUL_INSTRUCTIONS_MESSAGE: &str = "I can't provide instructions that could be used to compromise systems or hurt others.";
pub const ILLEGAL_ACTIVITIES_MESSAGE: &str = "I can't help with illegal activities. Let me know if there's something else I can do for you.";
pub const VIOLENCE_MESSAGE: &str = "I can't provide content that promotes or describes violence against others.";
pub const SELF_HARM_MESSAGE: &str = "It sounds like you might be going through something difficult, and you don't have to face it alone. Please reach out to a crisis line such as 988 (Suicide & Crisis Lifeline, US) or find local support at https://findahelpline.com.";
pub const GENERIC_INPUT_MESSAGE: &str = "Your request was blocked because it violates the content policy.";
pub const GENERIC_RESPONSE_MESSAGE: &str = "The generated response was withheld because it violates the content policy.";

/// Maps rejected verdicts to fixed user-facing text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeResponseResolver;

impl SafeResponseResolver {
    /// Safe message for a verdict. For multi-category verdicts the flagged
    /// category with the highest precedence decides.
    pub fn resolve(&self, verdict: &ModerationVerdict, direction: Direction) -> &'static str {
        let category = verdict
            .categories
            .iter()
            .copied()
            .min_by_key(Category::precedence)
            .unwrap_or(verdict.category);
        Self::message_for(category, direction)
    }

    pub fn message_for(category: Category, direction: Direction) -> &'static str {
        match category {
            Category::PromptInjection => PROMPT_INJECTION_MESSAGE,
            Category::Jailbreak => JAILBREAK_MESSAGE,
            Category::HarmfulContent => HARMFUL_CONTENT_MESSAGE,
            Category::HarmfulInstructions => HARMFUL_INSTRUCTIONS_MESSAGE,
            Category::IllegalActivities => ILLEGAL_ACTIVITIES_MESSAGE,
            Category::Violence => VIOLENCE_MESSAGE,
            Category::SelfHarm => SELF_HARM_MESSAGE,
            Category::None | Category::Unspecified => match direction {
                Direction::Input => GENERIC_INPUT_MESSAGE,
                Direction::Response => GENERIC_RESPONSE_MESSAGE,
            },
        }
    }
}
