//! Moderation taxonomy.

use serde::{Deserialize, Serialize};

/// Closed set of categories a verdict can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    None,
    PromptInjection,
    Jailbreak,
    HarmfulContent,
    HarmfulInstructions,
    IllegalActivities,
    Violence,
    SelfHarm,
    Unspecified,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::None,
        Category::PromptInjection,
        Category::Jailbreak,
        Category::HarmfulContent,
        Category::HarmfulInstructions,
        Category::IllegalActivities,
        Category::Violence,
        Category::SelfHarm,
        Category::Unspecified,
    ];

    /// Categories the input classifier checks, in declaration order.
    pub const INPUT: &'static [Category] = &[
        Category::PromptInjection,
        Category::Jailbreak,
        Category::HarmfulContent,
    ];

    /// Categories the response classifier checks, highest precedence first.
    pub const RESPONSE: &'static [Category] = &[
        Category::HarmfulInstructions,
        Category::IllegalActivities,
        Category::Violence,
        Category::SelfHarm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::None => "none",
            Category::PromptInjection => "prompt_injection",
            Category::Jailbreak => "jailbreak",
            Category::HarmfulContent => "harmful_content",
            Category::HarmfulInstructions => "harmful_instructions",
            Category::IllegalActivities => "illegal_activities",
            Category::Violence => "violence",
            Category::SelfHarm => "self_harm",
            Category::Unspecified => "unspecified",
        }
    }

    /// Rank used to pick one category out of several response flags.
    /// Lower is stronger; anything outside the response set sorts last.
    pub fn precedence(&self) -> usize {
        Self::RESPONSE
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::RESPONSE.len())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Category::None),
            "prompt_injection" => Ok(Category::PromptInjection),
            "jailbreak" => Ok(Category::Jailbreak),
            "harmful_content" => Ok(Category::HarmfulContent),
            "harmful_instructions" => Ok(Category::HarmfulInstructions),
            "illegal_activities" => Ok(Category::IllegalActivities),
            "violence" => Ok(Category::Violence),
            "self_harm" => Ok(Category::SelfHarm),
            "unspecified" => Ok(Category::Unspecified),
            other => Err(format!("unknown moderation category: {}", other)),
        }
    }
}

/// Which side of the exchange is being moderated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Response,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Response => "response",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_precedence_order() {
        assert!(Category::HarmfulInstructions.precedence() < Category::IllegalActivities.precedence());
        assert!(Category::IllegalActivities.precedence() < Category::Violence.precedence());
        assert!(Category::Violence.precedence() < Category::SelfHarm.precedence());
        assert!(Category::SelfHarm.precedence() < Category::Unspecified.precedence());
    }

    #[test]
    fn test_parse_category_accepts_dashes() {
        assert_eq!("self-harm".parse::<Category>(), Ok(Category::SelfHarm));
        assert_eq!("Prompt_Injection".parse::<Category>(), Ok(Category::PromptInjection));
        assert!("spam".parse::<Category>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Category::HarmfulInstructions).unwrap();
        assert_eq!(json, "\"harmful_instructions\"");
    }
}
