//! The maintenance-time view of a stored memory: retrieval only needs
//! [`scaffold_memory::MemoryRecord`]'s decay-scoring fields, but
//! dedup/linking/dormancy need the fuller lineage record the memory
//! store actually persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a memory's content came from, governing dedup precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityTier {
    /// Lowest precedence: superseded by a later resolution.
    Deprecated,
    /// The model inferred this without explicit user confirmation.
    AgentInferred,
    /// The user stated this directly.
    UserAsserted,
    /// Independently confirmed, e.g. by a tool result or a second
    /// source.
    Confirmed,
}

/// Whether a memory is still considered live for retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    /// Eligible for retrieval as normal.
    Active,
    /// Flagged as unused past the archival threshold; still present,
    /// not automatically removed.
    Dormant,
}

/// The full lineage record maintenance operates over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    /// Memory id, shared with [`scaffold_memory::MemoryRecord::id`].
    pub id: String,
    /// Content used for similarity search during dedup.
    pub content: String,
    /// Free-form tags used for related-memory linking.
    pub tags: Vec<String>,
    /// Source/confirmation tier.
    pub validity: ValidityTier,
    /// Never auto-deprecated even when outscored in a dedup pair.
    pub load_bearing: bool,
    /// Current relevance classification.
    pub relevance: Relevance,
    /// Times this memory has been emitted to a turn.
    pub access_count: u32,
    /// When this memory was created.
    pub created_at: DateTime<Utc>,
    /// The maintenance cycle counter at creation time, used to measure
    /// dormancy in cycles rather than wall-clock time.
    pub created_cycle: u64,
    /// When this memory was last emitted, if ever.
    pub last_accessed: Option<DateTime<Utc>>,
    /// Ids of memories already linked as related.
    pub related_memory_ids: Vec<String>,
    /// Set once a dedup pass supersedes this memory.
    pub superseded_by: Option<String>,
}
