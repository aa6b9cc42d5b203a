//! Moderated chat-completion gateway.
//!
//! Prompts are screened before any provider is contacted and responses are
//! screened before they reach the caller. Unsafe content is replaced with a
//! category-specific safe message.

pub mod config;
pub mod errors;
pub mod llm;
pub mod moderation;
pub mod pipeline;

#[cfg(feature = "api")]
pub mod api;

#[cfg(feature = "cli")]
pub mod cli;
