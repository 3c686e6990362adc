//! Ontology upkeep: re-runs resolution over candidates that arrived
//! since the last cycle, nudges relationship confidence from
//! co-retrieval evidence, drops edges that point at superseded
//! entities, and rebuilds a one-line summary per merged entity.

use scaffold_ontology::{RelationshipEdge, ResolutionConfig, ResolutionEngine, ResolvedEntity};
use std::collections::{BTreeMap, BTreeSet};

pub use scaffold_ontology::{EntityCandidate, ResolutionOutput};

/// Re-runs entity resolution over `pending` candidates that weren't
/// part of the turn-time resolution path.
pub fn rerun_resolution(pending: Vec<EntityCandidate>, config: ResolutionConfig, now: chrono::DateTime<chrono::Utc>) -> ResolutionOutput {
    ResolutionEngine::new(config).resolve_batch(pending, now).result
}

/// Bumps `confidence` on each edge by `boost_per_occurrence` per
/// recorded co-retrieval of its endpoints, capped at `1.0`. Edges with
/// no co-retrieval evidence are left untouched.
pub fn update_relationship_confidence(edges: &mut [RelationshipEdge], co_retrieval_counts: &BTreeMap<(String, String), usize>, boost_per_occurrence: f64) {
    for edge in edges.iter_mut() {
        let key = if edge.from < edge.to {
            (edge.from.clone(), edge.to.clone())
        } else {
            (edge.to.clone(), edge.from.clone())
        };
        if let Some(count) = co_retrieval_counts.get(&key) {
            edge.confidence = (edge.confidence + boost_per_occurrence * (*count as f64)).min(1.0);
        }
    }
}

/// Drops edges whose `from` or `to` names a superseded entity.
pub fn compact_deprecated(edges: Vec<RelationshipEdge>, superseded: &BTreeSet<String>) -> Vec<RelationshipEdge> {
    edges.into_iter().filter(|e| !superseded.contains(&e.from) && !superseded.contains(&e.to)).collect()
}

/// Produces `entity_id -> summary` for every entity that absorbed more
/// than one candidate this cycle.
pub fn rebuild_summaries(resolved: &[ResolvedEntity]) -> BTreeMap<String, String> {
    resolved
        .iter()
        .filter(|e| e.provenance_chain.len() > 1)
        .map(|e| {
            let aliases = if e.aliases.is_empty() { String::from("no known aliases") } else { e.aliases.join(", ") };
            let summary = format!(
                "{} ({}); merged from {} sources; aliases: {}",
                e.entity_id,
                e.entity_type,
                e.provenance_chain.len(),
                aliases
            );
            (e.entity_id.clone(), summary)
        })
        .collect()
}
