//! Relationship resolution: turns a candidate's relationship hints
//! into typed edges against already-resolved entities, or an
//! `unresolved` stub when no target can be found.

use crate::preprocess::normalize_name;
use crate::score::name_similarity;
use crate::types::ResolvedEntity;
use serde::{Deserialize, Serialize};

/// A hint's self-reported confidence at or above this is trusted as a
/// typed relationship's confidence outright. Below it, the edge is
/// still created but its confidence is recomputed from name
/// similarity against the resolved target rather than taken on faith.
const TYPED_RELATIONSHIP_THRESHOLD: f64 = 0.80;

/// A hint that a candidate participates in a relationship, prior to
/// resolving the target to a canonical entity id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipHint {
    /// Relationship label, e.g. `employs`, `subsidiary_of`.
    pub relationship: String,
    /// Best-known name or identifier of the target entity.
    pub target_name_or_id: String,
    /// Confidence the source reports for this hint, `[0, 1]`.
    pub confidence: f64,
}

/// A resolved relationship edge between two canonical entities (or an
/// unresolved stub target).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
    /// Source entity id.
    pub from: String,
    /// Relationship label.
    pub relationship: String,
    /// Target entity id, or an `unresolved:<name>` stub id.
    pub to: String,
    /// Confidence backing this edge.
    pub confidence: f64,
    /// Whether `to` is a real resolved entity or an unresolved stub.
    pub resolved: bool,
}

/// The confidence stamped on a typed edge when the hint's own
/// confidence falls below [`TYPED_RELATIONSHIP_THRESHOLD`]: the best
/// name similarity between the hint's target reference and the
/// matched entity's id, aliases, and identifiers.
fn scored_confidence(target_name_or_id: &str, entity: &ResolvedEntity) -> f64 {
    let needle = normalize_name(target_name_or_id);
    std::iter::once(&entity.entity_id)
        .chain(entity.aliases.iter())
        .chain(entity.identifiers.iter())
        .map(|candidate| name_similarity(&needle, &normalize_name(candidate)))
        .fold(0.0_f64, f64::max)
}

/// Resolves `hints` for `from_entity_id` against `known_entities` by
/// name/alias/identifier match. A found target gets a typed edge at
/// the hint's own confidence when that confidence is at least
/// [`TYPED_RELATIONSHIP_THRESHOLD`], otherwise at a confidence scored
/// from name similarity against the matched entity. No target found
/// creates an `unresolved` stub at the hint's own confidence.
pub fn resolve_relationship_hints(
    from_entity_id: &str,
    hints: &[RelationshipHint],
    known_entities: &[ResolvedEntity],
) -> Vec<RelationshipEdge> {
    hints
        .iter()
        .map(|hint| {
            let target = known_entities.iter().find(|e| {
                e.entity_id == hint.target_name_or_id
                    || e.aliases.iter().any(|a| a == &hint.target_name_or_id)
                    || e.identifiers.iter().any(|i| i == &hint.target_name_or_id)
            });

            match target {
                Some(entity) => {
                    let confidence = if hint.confidence >= TYPED_RELATIONSHIP_THRESHOLD {
                        hint.confidence
                    } else {
                        scored_confidence(&hint.target_name_or_id, entity)
                    };
                    RelationshipEdge {
                        from: from_entity_id.to_string(),
                        relationship: hint.relationship.clone(),
                        to: entity.entity_id.clone(),
                        confidence,
                        resolved: true,
                    }
                }
                None => RelationshipEdge {
                    from: from_entity_id.to_string(),
                    relationship: hint.relationship.clone(),
                    to: format!("unresolved:{}", hint.target_name_or_id),
                    confidence: hint.confidence,
                    resolved: false,
                },
            }
        })
        .collect()
}
