#![deny(missing_docs)]
//! Organization Kernel — role routing, PACE failure-response doctrine,
//! and SALUTE status reporting.
//!
//! Runs immediately after the Belief State Tracker. Activates only
//! when an active [`Organization`] sentinel exists; otherwise every
//! downstream filter defaults to "allow all", matching the pipeline's
//! backward-compatibility guarantee.

mod pace;
mod role;
mod salute;

pub use pace::{AgentFailureState, PaceEvaluation, PaceLevel, PacePlan, PaceTier, PaceTrigger};
pub use role::{select_role, Capabilities, Doctrine, Organization, OrgMode, Role, RoleType};
pub use salute::{
    Activity, Environment, Location, SaluteReport, Status, Time, Unit, WorkflowStatus,
};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to organization-kernel processing. Per the
/// component's failure semantics, none of these ever escape
/// [`OrgKernel::process`] — any internal problem degrades to "no role
/// active" and the turn proceeds unfiltered.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OrgError {
    /// No organization is currently marked active.
    #[error("no active organization")]
    NoActiveOrganization,

    /// The active organization references a role profile that wasn't
    /// loaded.
    #[error("role not found: {0}")]
    RoleNotFound(String),

    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

mod kernel;
pub use kernel::{OrgKernel, OrgOutput, RoleRuntimeState};

/// What the Organization Kernel reports to the pipeline for a turn.
pub type OrgOutcome = ComponentOutcome<OrgOutput>;
