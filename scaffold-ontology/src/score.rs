//! Weighted five-axis composite scoring for a candidate pair within a
//! block.

use crate::preprocess::{canonicalize_address, extract_identifiers, normalize_name};
use crate::types::EntityCandidate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-axis weights, must sum to `1.0` for the composite to land in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight for name similarity.
    pub name: f64,
    /// Weight for exact identifier match.
    pub identifier: f64,
    /// Weight for address token overlap.
    pub address: f64,
    /// Weight for date proximity.
    pub date: f64,
    /// Weight for context Jaccard similarity.
    pub context: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            name: 0.35,
            identifier: 0.30,
            address: 0.15,
            date: 0.10,
            context: 0.10,
        }
    }
}

/// Name similarity in `[0, 1]`, via Jaro-Winkler — rewards shared
/// prefixes, which suits organization/person names better than a
/// plain edit distance.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(a, b)
}

fn token_overlap_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 1.0;
    }
    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

fn date_score(a: &str, b: &str) -> f64 {
    use chrono::NaiveDate;
    let Ok(date_a) = NaiveDate::parse_from_str(a, "%Y-%m-%d") else {
        return 0.0;
    };
    let Ok(date_b) = NaiveDate::parse_from_str(b, "%Y-%m-%d") else {
        return 0.0;
    };
    let days = (date_a - date_b).num_days().unsigned_abs() as f64;
    if days <= 1.0 {
        1.0
    } else if days >= 365.0 {
        0.0
    } else {
        1.0 - (days / 365.0)
    }
}

fn context_jaccard(a: &[String], b: &[String]) -> f64 {
    let set_a: BTreeSet<&String> = a.iter().collect();
    let set_b: BTreeSet<&String> = b.iter().collect();
    if set_a.is_empty() && set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Scores a candidate pair over the five axes and returns the
/// weighted composite.
pub fn score_pair(a: &EntityCandidate, b: &EntityCandidate, weights: ScoreWeights) -> f64 {
    let name_score = match (a.name(), b.name()) {
        (Some(na), Some(nb)) => name_similarity(&normalize_name(na), &normalize_name(nb)),
        _ => 0.0,
    };

    let ids_a: BTreeSet<String> = extract_identifiers(&serde_json::to_string(&a.properties).unwrap_or_default())
        .into_iter()
        .collect();
    let ids_b: BTreeSet<String> = extract_identifiers(&serde_json::to_string(&b.properties).unwrap_or_default())
        .into_iter()
        .collect();
    let identifier_score = if ids_a.intersection(&ids_b).next().is_some() { 1.0 } else { 0.0 };

    let address_score = match (a.address(), b.address()) {
        (Some(addr_a), Some(addr_b)) => {
            token_overlap_ratio(&canonicalize_address(addr_a), &canonicalize_address(addr_b))
        }
        _ => 0.0,
    };

    let date_axis = match (a.date(), b.date()) {
        (Some(date_a), Some(date_b)) => date_score(date_a, date_b),
        _ => 0.0,
    };

    let context_axis = context_jaccard(&a.context_terms(), &b.context_terms());

    weights.name * name_score
        + weights.identifier * identifier_score
        + weights.address * address_score
        + weights.date * date_axis
        + weights.context * context_axis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Provenance;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn candidate(name: &str, address: &str) -> EntityCandidate {
        let mut properties = BTreeMap::new();
        properties.insert("name".to_string(), json!(name));
        properties.insert("address".to_string(), json!(address));
        EntityCandidate {
            candidate_id: name.to_string(),
            entity_type: "organization".into(),
            properties,
            relationship_hints: vec![],
            provenance: Provenance {
                source_id: "src".into(),
                record_id: "rec".into(),
                source_type: "test".into(),
                ingested_at: Utc::now(),
                confidence: 0.9,
            },
        }
    }

    #[test]
    fn identical_names_and_addresses_score_near_one() {
        let a = candidate("Acme Corp", "123 Main St");
        let b = candidate("Acme Corp", "123 Main Street");
        let score = score_pair(&a, &b, ScoreWeights::default());
        assert!(score > 0.5, "expected high composite, got {score}");
    }

    #[test]
    fn unrelated_entities_score_low() {
        let a = candidate("Acme Corp", "123 Main St");
        let b = candidate("Globex Industries", "99 Offshore Way");
        let score = score_pair(&a, &b, ScoreWeights::default());
        assert!(score < 0.3, "expected low composite, got {score}");
    }

    #[test]
    fn name_similarity_of_identical_strings_is_one() {
        assert_eq!(name_similarity("acme corp", "acme corp"), 1.0);
    }
}
