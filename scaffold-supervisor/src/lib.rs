#![deny(missing_docs)]
//! Supervisor — the post-turn anomaly scan that injects cooldown-gated
//! steering messages into the next turn.
//!
//! Reads [`scaffold_org`]'s PACE state and [`scaffold_tools_gate`]'s
//! failure ring; never writes to either. Steering messages are
//! additive context the pipeline hands to the model alongside the
//! workflow's current-node instruction, never a replacement for it.

mod anomaly;
mod cooldown;
mod supervisor;

pub use anomaly::{detect, AnomalyKind, AnomalyThresholds};
pub use cooldown::CooldownTracker;
pub use supervisor::{Supervisor, SteeringMessage, SupervisorConfig, SupervisorOutput};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to supervisor processing. None of these escape
/// [`Supervisor::scan`] — an internal problem degrades to "no
/// anomalies detected" rather than blocking the next turn.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// What the Supervisor reports after a turn.
pub type SupervisorOutcome = ComponentOutcome<SupervisorOutput>;
