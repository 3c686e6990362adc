//! Blocking: groups candidates that might be the same entity before
//! the quadratic scoring pass runs only within each group.

use crate::preprocess::{extract_identifiers, normalize_name};
use crate::types::EntityCandidate;
use std::collections::BTreeMap;

/// Blocking key a candidate falls under. Kept closed since the set of
/// blocking strategies is fixed rather than open-ended.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum BlockKey {
    Identifier(String),
    NamePrefixType(String, String),
}

fn block_keys(candidate: &EntityCandidate) -> Vec<BlockKey> {
    let mut keys = Vec::new();
    let raw = serde_json::to_string(&candidate.properties).unwrap_or_default();
    for id in extract_identifiers(&raw) {
        keys.push(BlockKey::Identifier(id));
    }
    if let Some(name) = candidate.name() {
        let normalized = normalize_name(name);
        // The first-3-characters-of-name block doubles as the phonetic
        // proxy; a real Metaphone encoder would replace this key.
        let prefix: String = normalized.chars().filter(|c| c.is_alphanumeric()).take(3).collect();
        if !prefix.is_empty() {
            keys.push(BlockKey::NamePrefixType(prefix, candidate.entity_type.clone()));
        }
    }
    keys
}

/// Groups candidate indices into blocks; a candidate with no
/// extractable key (no name, no identifier) gets its own singleton
/// block keyed by its index, so it never silently vanishes.
pub fn block_candidates(candidates: &[EntityCandidate]) -> Vec<Vec<usize>> {
    let mut blocks: BTreeMap<BlockKey, Vec<usize>> = BTreeMap::new();
    let mut singletons = Vec::new();

    for (i, candidate) in candidates.iter().enumerate() {
        let keys = block_keys(candidate);
        if keys.is_empty() {
            singletons.push(vec![i]);
            continue;
        }
        for key in keys {
            blocks.entry(key).or_default().push(i);
        }
    }

    let mut result: Vec<Vec<usize>> = blocks.into_values().collect();
    result.extend(singletons);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap as Map;

    fn candidate(id: &str, name: &str) -> EntityCandidate {
        let mut properties = Map::new();
        properties.insert("name".to_string(), json!(name));
        EntityCandidate {
            candidate_id: id.to_string(),
            entity_type: "organization".into(),
            properties,
            relationship_hints: vec![],
            provenance: Provenance {
                source_id: "s".into(),
                record_id: "r".into(),
                source_type: "test".into(),
                ingested_at: Utc::now(),
                confidence: 1.0,
            },
        }
    }

    #[test]
    fn same_name_prefix_lands_in_same_block() {
        let candidates = vec![candidate("a", "Acme Corp"), candidate("b", "Acme Industries")];
        let blocks = block_candidates(&candidates);
        assert!(blocks.iter().any(|b| b.len() == 2));
    }

    #[test]
    fn unrelated_names_land_in_different_blocks() {
        let candidates = vec![candidate("a", "Acme Corp"), candidate("b", "Globex Inc")];
        let blocks = block_candidates(&candidates);
        assert!(blocks.iter().all(|b| b.len() < 2));
    }
}
