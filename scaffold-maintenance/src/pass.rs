//! Orchestrates one maintenance cycle over the five sub-passes.

use crate::cluster::{detect_clusters, ClusterCandidate};
use crate::dedup::{find_and_resolve, DedupOutcome};
use crate::dormancy::{flag_dormant, DormancyFlag};
use crate::linking::{find_links, LinkDecision};
use crate::ontology_upkeep::{compact_deprecated, rebuild_summaries, rerun_resolution, EntityCandidate};
use crate::record::MaintenanceRecord;
use chrono::{DateTime, Utc};
use scaffold_core::outcome::ComponentOutcome;
use scaffold_memory::{CoRetrievalEntry, SimilarityIndex};
use scaffold_ontology::{RelationshipEdge, ResolutionConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Tunables for one maintenance cycle, mirroring the defaults named
/// per sub-pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Master switch; disabled skips every sub-pass.
    pub enabled: bool,
    /// Turns between maintenance runs; owned by the caller's idle-turn
    /// counter, kept here so it travels with the rest of the config.
    pub maintenance_interval_loops: u32,
    /// Similarity floor for a dedup candidate pair.
    pub dedup_similarity_threshold: f64,
    /// Cap on dedup pairs resolved per cycle.
    pub max_pairs_per_cycle: usize,
    /// Minimum shared tags to link two memories.
    pub tag_overlap_threshold: usize,
    /// Cap on related-memory links per memory.
    pub max_related_per_memory: usize,
    /// Co-occurrence count above which a pair is a cluster candidate.
    pub cluster_threshold: usize,
    /// Cycles with zero access before a memory is flagged dormant.
    pub archival_threshold_cycles: u64,
    /// Confidence boost per co-retrieval occurrence when updating
    /// relationship edges.
    pub relationship_boost_per_occurrence: f64,
    /// Config passed through to the re-run resolution pass.
    pub resolution: ResolutionConfig,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        MaintenanceConfig {
            enabled: true,
            maintenance_interval_loops: 25,
            dedup_similarity_threshold: 0.90,
            max_pairs_per_cycle: 20,
            tag_overlap_threshold: 3,
            max_related_per_memory: 10,
            cluster_threshold: 5,
            archival_threshold_cycles: 25,
            relationship_boost_per_occurrence: 0.05,
            resolution: ResolutionConfig::default(),
        }
    }
}

/// Everything one maintenance cycle decided.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaintenanceOutput {
    /// Resolved and flagged dedup pairs.
    pub dedup_decisions: Vec<DedupOutcome>,
    /// Proposed related-memory links.
    pub link_decisions: Vec<LinkDecision>,
    /// Promoted co-retrieval clusters.
    pub cluster_candidates: Vec<ClusterCandidate>,
    /// Newly dormant memories.
    pub dormancy_flags: Vec<DormancyFlag>,
    /// Relationship edges after confidence update and compaction.
    pub relationship_edges: Vec<RelationshipEdge>,
    /// Entity summaries rebuilt for multi-source entities this cycle.
    pub entity_summaries: BTreeMap<String, String>,
}

/// Runs one maintenance cycle. Never called concurrently with a turn
/// — the pipeline's single-writer discipline over the memory and
/// relationship stores is the caller's responsibility, not this
/// crate's; see the concurrency notes the pipeline crate documents.
pub struct MaintenancePass {
    config: MaintenanceConfig,
}

impl MaintenancePass {
    /// Builds a pass with the given configuration.
    pub fn new(config: MaintenanceConfig) -> Self {
        MaintenancePass { config }
    }

    /// Runs the full cycle. `superseded` should already include any
    /// entity ids superseded by a prior cycle, so this cycle's
    /// relationship compaction accounts for them too.
    #[allow(clippy::too_many_arguments)]
    pub fn run(
        &self,
        records: &[MaintenanceRecord],
        similarity_index: &dyn SimilarityIndex,
        co_retrieval_log: &[CoRetrievalEntry],
        current_cycle: u64,
        pending_candidates: Vec<EntityCandidate>,
        mut relationship_edges: Vec<RelationshipEdge>,
        superseded: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> ComponentOutcome<MaintenanceOutput> {
        if !self.config.enabled {
            tracing::debug!("maintenance disabled, passthrough");
            return ComponentOutcome::proceed(MaintenanceOutput::default()).note("maintenance disabled, passthrough");
        }

        let dedup_decisions = find_and_resolve(records, similarity_index, self.config.dedup_similarity_threshold, self.config.max_pairs_per_cycle)
            .into_iter()
            .map(|d| d.outcome)
            .collect::<Vec<_>>();

        let link_decisions = find_links(records, self.config.tag_overlap_threshold, self.config.max_related_per_memory);

        let cluster_candidates = detect_clusters(co_retrieval_log, self.config.cluster_threshold);

        let dormancy_flags = flag_dormant(records, current_cycle, self.config.archival_threshold_cycles);

        let resolution = rerun_resolution(pending_candidates, self.config.resolution, now);

        let mut superseded = superseded.clone();
        for decision in &dedup_decisions {
            match decision {
                DedupOutcome::Resolved { winner, loser } => {
                    superseded.insert(loser.clone());
                    tracing::debug!(winner, loser, "dedup pair resolved");
                }
                DedupOutcome::FlaggedLoadBearing { flagged, .. } => {
                    tracing::warn!(flagged, "load-bearing memory would have been superseded, flagging instead");
                }
                DedupOutcome::FlaggedForReview { a, b } => {
                    tracing::warn!(a, b, "both sides user-asserted, flagging for review");
                }
            }
        }

        let co_retrieval_entity_counts = entity_co_retrieval_counts(co_retrieval_log);
        crate::ontology_upkeep::update_relationship_confidence(&mut relationship_edges, &co_retrieval_entity_counts, self.config.relationship_boost_per_occurrence);
        let relationship_edges = compact_deprecated(relationship_edges, &superseded);

        let entity_summaries = rebuild_summaries(&resolution.resolved);

        let mut outcome = ComponentOutcome::proceed(MaintenanceOutput {
            dedup_decisions,
            link_decisions,
            cluster_candidates,
            dormancy_flags,
            relationship_edges,
            entity_summaries,
        });
        if !outcome.result.dedup_decisions.is_empty() {
            let note = format!("{} dedup decisions this cycle", outcome.result.dedup_decisions.len());
            outcome = outcome.note(note);
        }
        outcome
    }
}

/// Co-retrieval counts keyed by memory id pair, reused as a stand-in
/// entity-pair signal: callers whose memory ids double as entity ids
/// (the common case once ontology extension tags a memory with the
/// entities it mentions) get relationship-confidence boosts for free.
fn entity_co_retrieval_counts(log: &[CoRetrievalEntry]) -> BTreeMap<(String, String), usize> {
    let mut counts = BTreeMap::new();
    for entry in log {
        let ids = &entry.emitted_memory_ids;
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let pair = if ids[i] < ids[j] {
                    (ids[i].clone(), ids[j].clone())
                } else {
                    (ids[j].clone(), ids[i].clone())
                };
                *counts.entry(pair).or_insert(0) += 1;
            }
        }
    }
    counts
}
