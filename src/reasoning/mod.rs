// =============================================================================
// Reasoning Engine boundary
// =============================================================================
//
// The engine is opaque: it receives a `Contract` and returns raw text that is
// supposed to match the contract's schema. Nothing returned from here is
// trusted until it has passed `validator::validate`.
// =============================================================================

pub mod openai;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::contract::Contract;

pub use openai::OpenAiClient;

/// Token accounting reported by the engine, when available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Raw engine output for one call.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Unvalidated response text.
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Every way a single engine call can fail before validation.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("engine call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("engine returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine refused: {0}")]
    Refused(String),

    #[error("engine returned no content")]
    EmptyResponse,

    #[error("malformed engine envelope: {0}")]
    MalformedEnvelope(String),
}

/// One-shot inference against an external reasoning service.
///
/// Implementations make exactly one attempt; retries are never performed.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Identifier of the model behind this engine, for logs.
    fn model(&self) -> &str;

    async fn infer(&self, contract: &Contract) -> Result<Completion, InferenceError>;
}
