#![deny(missing_docs)]
//! Tool Fallback & Meta-Reasoning Gate — the pair of hook points that
//! surround every tool invocation the model performs: argument
//! validation and fallback advisory before the call, failure
//! classification and bookkeeping after.
//!
//! Built atop [`scaffold_tool`]'s registry and the same [`HookPoint`]
//! vocabulary `scaffold-hooks` dispatches against
//! (`PreToolUse`/`PostToolUse`), though this crate owns its own
//! decision logic rather than implementing [`Hook`] directly, since
//! its state (failure counters, advice tables) outlives any single
//! dispatch.
//!
//! [`HookPoint`]: scaffold_core::hook::HookPoint
//! [`Hook`]: scaffold_core::hook::Hook

mod advisor;
mod classify;
mod gate;
mod schema;
mod tracker;

pub use advisor::AdviceTable;
pub use classify::{classify_failure, ErrorKind};
pub use gate::{GatedCallOutput, PostCallOutput, PreCallOutput, ToolGate};
pub use schema::{ArgSchema, ValidationResult};
pub use tracker::{FailureRecord, FailureTracker};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to gate processing. None of these escape the
/// gate's public entry points — a gate bug must never block a tool
/// call, so any internal failure degrades to pass-through.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ToolGateError {
    /// The named tool has no registered schema.
    #[error("no schema for tool: {0}")]
    NoSchema(String),

    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// What the gate reports for a single tool call's pre-check.
pub type PreCallOutcome = ComponentOutcome<PreCallOutput>;

/// What the gate reports after a tool call completes.
pub type PostCallOutcome = ComponentOutcome<PostCallOutput>;
