//! Related-memory linking: pairwise tag overlap above a threshold
//! mutually links two memories, capped per memory.

use crate::record::MaintenanceRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A pair to mutually link, each bounded by `max_related_per_memory`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDecision {
    /// One side of the link.
    pub a: String,
    /// The other side.
    pub b: String,
    /// Number of tags shared.
    pub shared_tags: usize,
}

fn tag_overlap(a: &[String], b: &[String]) -> usize {
    let set_a: BTreeSet<&String> = a.iter().collect();
    let set_b: BTreeSet<&String> = b.iter().collect();
    set_a.intersection(&set_b).count()
}

/// Scans every pair in `records` and proposes links for pairs whose
/// tag overlap meets `tag_overlap_threshold`, skipping a pair once
/// either side has already reached `max_related_per_memory` existing
/// links (counting both stored links and links proposed earlier in
/// this same scan).
pub fn find_links(records: &[MaintenanceRecord], tag_overlap_threshold: usize, max_related_per_memory: usize) -> Vec<LinkDecision> {
    let mut counts: std::collections::BTreeMap<&str, usize> =
        records.iter().map(|r| (r.id.as_str(), r.related_memory_ids.len())).collect();
    let mut decisions = Vec::new();

    for i in 0..records.len() {
        for j in (i + 1)..records.len() {
            let a = &records[i];
            let b = &records[j];
            if a.related_memory_ids.iter().any(|id| id == &b.id) {
                continue;
            }
            if counts[a.id.as_str()] >= max_related_per_memory || counts[b.id.as_str()] >= max_related_per_memory {
                continue;
            }
            let overlap = tag_overlap(&a.tags, &b.tags);
            if overlap >= tag_overlap_threshold {
                decisions.push(LinkDecision {
                    a: a.id.clone(),
                    b: b.id.clone(),
                    shared_tags: overlap,
                });
                *counts.get_mut(a.id.as_str()).unwrap() += 1;
                *counts.get_mut(b.id.as_str()).unwrap() += 1;
            }
        }
    }

    decisions
}
