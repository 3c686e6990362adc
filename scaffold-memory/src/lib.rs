#![deny(missing_docs)]
//! Memory Enhancement — retrieval-time multi-query expansion,
//! temporal-decay scoring, related-memory boosting, and
//! ontology-aware extension.
//!
//! Runs after the Belief State Tracker, Organization Kernel, and
//! Graph Workflow Engine, immediately before the model call. The
//! similarity backend and the ontology index are both supplied as
//! trait objects so this crate stays decoupled from whatever actually
//! stores embeddings or entities — `scaffold-ontology` satisfies the
//! ontology traits at the pipeline boundary.

mod config;
mod decay;
mod ontology_ext;
mod query;
mod retrieval;

pub use config::MemoryConfig;
pub use decay::{decay_weighted_score, recency_score};
pub use ontology_ext::{EntityHit, EntityIndex, RelationshipEdge, RelationshipNeighbors};
pub use query::{expand_queries, QueryVariant};
pub use retrieval::{
    CoRetrievalEntry, MemoryCandidate, MemoryRecord, MemoryRetriever, RetrievalOutput,
    SimilarityIndex,
};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to memory retrieval. None of these escape
/// [`MemoryRetriever::retrieve`] — a backend failure degrades to an
/// empty result set rather than blocking the turn.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MemoryError {
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

/// What the Memory Enhancement component reports for a turn.
pub type MemoryOutcome = ComponentOutcome<RetrievalOutput>;
