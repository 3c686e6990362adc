#![deny(missing_docs)]
//! Ontology Store & Entity Resolution — deterministic, model-free
//! matching of ingestion candidates into canonical entities, plus
//! relationship discovery between them.
//!
//! The pipeline is preprocess → block → score → threshold → union-find
//! transitive closure → merge → relationship resolution, run entirely
//! over in-memory candidate batches; no network or model calls.

mod block;
mod merge;
mod preprocess;
mod relationship;
mod resolution;
mod score;
mod types;
mod unionfind;

pub use block::block_candidates;
pub use merge::merge_group;
pub use preprocess::{canonicalize_address, extract_identifiers, normalize_name, parse_date_to_iso};
pub use relationship::{resolve_relationship_hints, RelationshipEdge, RelationshipHint};
pub use resolution::{AuditRecord, Decision, ResolutionConfig, ResolutionEngine, ResolutionOutput};
pub use score::{score_pair, ScoreWeights};
pub use types::{EntityCandidate, Provenance, ResolvedEntity};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to entity resolution. None of these escape
/// [`ResolutionEngine::resolve_batch`] — a malformed candidate is
/// simply excluded from the batch rather than aborting it.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum OntologyError {
    /// A candidate was missing a required field for its entity type.
    #[error("invalid candidate: {0}")]
    InvalidCandidate(String),

    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// What the Ontology Store reports for a resolution cycle.
pub type OntologyOutcome = ComponentOutcome<ResolutionOutput>;
