//! Cluster detection: memories that keep getting emitted together are
//! surfaced as candidates for a future consolidation pass. Observation
//! only — nothing here merges or rewrites memories.

use scaffold_memory::CoRetrievalEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pair of memories that co-occurred in emitted results more than
/// the cluster threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterCandidate {
    /// The pair's ids, sorted.
    pub pair: (String, String),
    /// Number of co-retrieval cycles the pair appeared together in.
    pub co_occurrences: usize,
}

/// Scans `log` for memory pairs appearing together in the same
/// cycle's `emitted_memory_ids` more than `cluster_threshold` times.
pub fn detect_clusters(log: &[CoRetrievalEntry], cluster_threshold: usize) -> Vec<ClusterCandidate> {
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();

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
        .into_iter()
        .filter(|(_, count)| *count > cluster_threshold)
        .map(|(pair, co_occurrences)| ClusterCandidate { pair, co_occurrences })
        .collect()
}
