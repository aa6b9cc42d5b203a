pub mod provider;
pub mod types;
pub mod catalog;
pub mod http;
pub mod sse;
pub mod compat;
pub mod openai;
pub mod anthropic;
pub mod groq;
pub mod gemini;
pub mod registry;

pub use provider::{FragmentSink, ProviderAdapter};
pub use registry::{create_adapter, ProviderRegistry};
pub use types::{
    ChatTurn, CompletionRequest, CompletionResult, GenerationParameters, ProviderId, Role, StreamChunk, Usage,
};
