//! Tunables for retrieval, decay, and the co-retrieval log, all with
//! the defaults spelled out alongside the formulas they feed.

use serde::{Deserialize, Serialize};

/// Retrieval-time configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Master switch; when `false` the retriever returns an empty
    /// result without consulting the backend.
    pub enabled: bool,
    /// Similarity queries issued per query variant.
    pub retrieval_k_per_variant: usize,
    /// Half-life, in hours, for temporal decay.
    pub half_life_hours: f64,
    /// Floor applied to the recency score.
    pub min_recency_score: f64,
    /// Weight given to recency vs. similarity in the final score.
    pub decay_weight: f64,
    /// Score bonus applied to related memories pulled back into the
    /// top-k on the second pass.
    pub related_boost: f64,
    /// Maximum memories injected into the model's context.
    pub max_injected: usize,
    /// Maximum co-retrieval log entries retained (FIFO eviction).
    pub co_retrieval_log_max_entries: usize,
    /// Maximum tokens retained in a `keyword` query variant.
    pub max_keyword_tokens: usize,
    /// Whether the ontology-aware extension runs.
    pub ontology_extension_enabled: bool,
    /// Maximum relationship neighbors injected per ontology hit.
    pub max_relationship_neighbors: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            enabled: true,
            retrieval_k_per_variant: 8,
            half_life_hours: 168.0,
            min_recency_score: 0.1,
            decay_weight: 0.15,
            related_boost: 0.08,
            max_injected: 5,
            co_retrieval_log_max_entries: 500,
            max_keyword_tokens: 12,
            ontology_extension_enabled: true,
            max_relationship_neighbors: 10,
        }
    }
}
