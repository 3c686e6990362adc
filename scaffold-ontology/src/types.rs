//! Ingestion candidates and resolved entities.

use crate::relationship::RelationshipHint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a candidate came from, carried through to the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    /// Identifier of the ingesting source.
    pub source_id: String,
    /// Identifier of the specific record within that source.
    pub record_id: String,
    /// Free-form source type, e.g. `crm_export`, `user_message`.
    pub source_type: String,
    /// When the candidate was ingested.
    pub ingested_at: DateTime<Utc>,
    /// Confidence the source itself reports, `[0, 1]`.
    pub confidence: f64,
}

/// A raw entity observation awaiting resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCandidate {
    /// Stable id for this candidate prior to resolution (e.g. a
    /// source-local key); distinct from the canonical entity id it
    /// may be merged into.
    pub candidate_id: String,
    /// Entity type, e.g. `organization`, `person`.
    pub entity_type: String,
    /// Raw properties as extracted from the source.
    pub properties: BTreeMap<String, Value>,
    /// Hints about relationships this candidate participates in.
    pub relationship_hints: Vec<RelationshipHint>,
    /// Where this candidate came from.
    pub provenance: Provenance,
}

impl EntityCandidate {
    /// The `name` property, if present and a string.
    pub fn name(&self) -> Option<&str> {
        self.properties.get("name").and_then(Value::as_str)
    }

    /// The `address` property, if present and a string.
    pub fn address(&self) -> Option<&str> {
        self.properties.get("address").and_then(Value::as_str)
    }

    /// The `date` property, if present and a string.
    pub fn date(&self) -> Option<&str> {
        self.properties.get("date").and_then(Value::as_str)
    }

    /// Context entity names/types associated with this candidate,
    /// read from a `context` array property.
    pub fn context_terms(&self) -> Vec<String> {
        self.properties
            .get("context")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default()
    }
}

/// The outcome of merging one or more candidates into a canonical
/// identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntity {
    /// Canonical entity id, the first merged candidate's id.
    pub entity_id: String,
    /// Entity type carried from the merged candidates.
    pub entity_type: String,
    /// Consolidated scalar properties (higher-confidence source wins
    /// on conflicts).
    pub properties: BTreeMap<String, Value>,
    /// Union of all identifier strings seen across merged candidates.
    pub identifiers: Vec<String>,
    /// Union of alias names seen across merged candidates.
    pub aliases: Vec<String>,
    /// Every provenance record that contributed to this entity.
    pub provenance_chain: Vec<Provenance>,
    /// Set when this entity has been superseded by a later merge;
    /// the record itself is preserved, never deleted.
    pub superseded_by: Option<String>,
}
