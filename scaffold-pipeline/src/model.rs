//! The single model-call boundary: a minimal, non-object-safe
//! [`ModelCaller`] trait the core drives exactly once per turn.
//!
//! Deliberately thin compared to a full provider abstraction — the
//! core never streams, never retries internally, and never manages a
//! ReAct loop of its own; each turn issues one call and hands tool use
//! back to the caller via [`scaffold_core::effect::Effect`] bookkeeping
//! at the pipeline's own tool gate. Reuses
//! [`scaffold_core::content::Content`] directly rather than defining a
//! parallel content representation.

use scaffold_core::content::Content;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Who authored a message in the conversation sent to the model.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The system/instruction role.
    System,
    /// The human or upstream caller.
    User,
    /// The model's own prior turns.
    Assistant,
}

/// One message in the request sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMessage {
    /// Who authored this message.
    pub role: Role,
    /// The message body.
    pub content: Content,
}

impl ModelMessage {
    /// Convenience constructor.
    pub fn new(role: Role, content: Content) -> Self {
        ModelMessage { role, content }
    }
}

/// A tool's advertised schema, as handed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// The tool's name, matched against `ContentBlock::ToolUse::name`.
    pub name: String,
    /// Human-readable description shown to the model.
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: serde_json::Value,
}

/// Why the model stopped generating.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished its reply with nothing further to do.
    EndTurn,
    /// The model wants to invoke one or more tools.
    ToolUse,
    /// The reply was cut off at `max_tokens`.
    MaxTokens,
    /// Blocked by content filtering.
    ContentFilter,
}

/// Token accounting for one model call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the request.
    pub input_tokens: u64,
    /// Tokens in the response.
    pub output_tokens: u64,
    /// Tokens served from a prompt cache, if the backend reports it.
    pub cache_read_tokens: Option<u64>,
    /// Tokens written to a prompt cache, if the backend reports it.
    pub cache_creation_tokens: Option<u64>,
}

/// A single call's worth of input to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Model identifier override, `None` defers to the caller's
    /// default.
    pub model: Option<String>,
    /// Full message history, system prompt excluded — carried
    /// separately in `system`.
    pub messages: Vec<ModelMessage>,
    /// Tools the model may call this turn.
    pub tools: Vec<ToolSchema>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f64>,
    /// The assembled system prompt: base prompt plus any per-turn
    /// addendum.
    pub system: Option<String>,
}

/// What the model returned for one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The reply body, possibly containing tool-use blocks.
    pub content: Content,
    /// Why generation stopped.
    pub stop_reason: StopReason,
    /// Token accounting for this call.
    pub usage: TokenUsage,
    /// The model identifier that actually served the request.
    pub model: String,
    /// Cost of this call, if the backend reports it.
    pub cost: Option<rust_decimal::Decimal>,
}

/// Failure calling the model.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
    /// The call failed outright.
    #[error("model call failed: {0}")]
    RequestFailed(String),
    /// Rate limited; safe to retry after backoff.
    #[error("rate limited")]
    RateLimited,
    /// The backend rejected the response shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ModelError {
    /// Whether the core should treat this as transient rather than
    /// fatal. Mirrors the failure classification the tool gate applies
    /// to tool errors, kept separate since model and tool failures feed
    /// different counters.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::RateLimited | ModelError::RequestFailed(_))
    }
}

/// The model boundary the core drives exactly once per turn.
///
/// Not object-safe (return-position `impl Future`) by design, mirroring
/// the underlying model-provider abstraction this crate composes with:
/// [`crate::core::CognitiveCore`] is generic over `M: ModelCaller`, and
/// the component machinery underneath it stays entirely trait-object
/// based so swapping the model implementation never touches it.
pub trait ModelCaller: Send + Sync {
    /// Issue one call to the model.
    fn call(&self, request: ModelRequest) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}
