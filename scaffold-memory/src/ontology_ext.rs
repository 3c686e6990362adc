//! Ontology-aware extension: scans the message for known entities and
//! surfaces their 1-hop relationship neighbors alongside retrieval.
//!
//! Kept as trait objects so this crate has no hard dependency on
//! `scaffold-ontology`'s storage — the pipeline wires a concrete
//! implementation in at construction time.

/// A mention of a known entity found in a message.
#[derive(Debug, Clone)]
pub struct EntityHit {
    /// The entity's canonical id.
    pub entity_id: String,
    /// The matched name or alias.
    pub matched_name: String,
    /// The entity's type, e.g. `organization`, `person`.
    pub entity_type: String,
}

/// A single relationship edge surfaced for a hit entity.
#[derive(Debug, Clone)]
pub struct RelationshipEdge {
    /// Source entity id.
    pub from: String,
    /// Relationship label, e.g. `employs`, `co_located`.
    pub relationship: String,
    /// Target entity id.
    pub to: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Looks up entity names/aliases mentioned in a message.
pub trait EntityIndex: Send + Sync {
    /// Returns every known entity whose name or alias appears in
    /// `message`.
    fn find_entities(&self, message: &str) -> Vec<EntityHit>;
}

/// Looks up 1-hop relationship neighbors for a resolved entity.
pub trait RelationshipNeighbors: Send + Sync {
    /// Returns up to `limit` relationship edges touching `entity_id`,
    /// sorted by descending confidence.
    fn neighbors(&self, entity_id: &str, limit: usize) -> Vec<RelationshipEdge>;
}

/// Renders a relationship edge into the structured block described by
/// spec: `Known connections: <from> --<rel>--> <to>`.
pub fn render_connection(edge: &RelationshipEdge) -> String {
    format!("Known connections: {} --{}--> {}", edge.from, edge.relationship, edge.to)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_expected_arrow_format() {
        let edge = RelationshipEdge {
            from: "acme_corp".into(),
            relationship: "employs".into(),
            to: "jane_doe".into(),
            confidence: 0.9,
        };
        assert_eq!(
            render_connection(&edge),
            "Known connections: acme_corp --employs--> jane_doe"
        );
    }
}
