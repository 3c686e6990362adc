#![deny(missing_docs)]
//! Maintenance Pass — the between-turn housekeeping cycle: memory
//! deduplication, related-memory linking, co-retrieval cluster
//! detection, dormancy flagging, and ontology upkeep.
//!
//! Runs only when the turn pipeline is idle, never concurrently with a
//! turn. Built atop `scaffold-memory`'s [`scaffold_memory::SimilarityIndex`]
//! and co-retrieval log, and `scaffold-ontology`'s resolution engine
//! and relationship edges — this crate owns none of that storage, it
//! only reads a snapshot and proposes decisions for the caller to
//! apply.

mod cluster;
mod dedup;
mod dormancy;
mod linking;
mod ontology_upkeep;
mod pass;
mod record;

pub use cluster::{detect_clusters, ClusterCandidate};
pub use dedup::{find_and_resolve, DedupDecision, DedupOutcome};
pub use dormancy::{flag_dormant, DormancyFlag};
pub use linking::{find_links, LinkDecision};
pub use ontology_upkeep::{compact_deprecated, rebuild_summaries, rerun_resolution, update_relationship_confidence, EntityCandidate, ResolutionOutput};
pub use pass::{MaintenanceConfig, MaintenanceOutput, MaintenancePass};
pub use record::{MaintenanceRecord, Relevance, ValidityTier};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to the maintenance pass. None of these escape
/// [`MaintenancePass::run`] — a backend read failure simply means
/// that sub-pass contributes an empty result for this cycle.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MaintenanceError {
    /// The similarity backend failed.
    #[error("similarity backend error: {0}")]
    Backend(String),

    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// What the Maintenance Pass reports for a cycle.
pub type MaintenanceOutcome = ComponentOutcome<MaintenanceOutput>;
