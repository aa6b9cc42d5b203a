//! Moderation pipeline: classifiers, verdicts and safe-response substitution.

pub mod category;
pub mod verdict;
pub mod classifier;
pub mod keyword;
pub mod resolver;
pub mod guardrails;

pub use category::{Category, Direction};
pub use verdict::{Evidence, ModerationVerdict, RuleHit};
pub use classifier::ModerationClassifier;
pub use keyword::{KeywordClassifier, MatchMode};
pub use resolver::SafeResponseResolver;
pub use guardrails::Guardrails;
