//! Pipeline-level errors.
//!
//! None of the eight wrapped components ever raise an error past their
//! own boundary — each degrades to passthrough internally. This enum
//! exists for the handful of failures that are the pipeline's own
//! responsibility: reading/writing session state and calling the
//! model. [`crate::core::CognitiveCore::execute`] still never lets one
//! of these escape as a hard failure — see its fatal-error trap.

use thiserror::Error;

/// Failures originating in the pipeline crate itself, as opposed to
/// one of the eight wrapped components (which never surface their own
/// errors — see each crate's own `*Error` type for what they degrade
/// internally instead).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The model call failed in a way the turn couldn't recover from.
    #[error("model call failed: {0}")]
    Model(String),

    /// A session state read or write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all for anything else.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
