use chrono::Utc;
use scaffold_memory::{
    EntityHit, EntityIndex, MemoryConfig, MemoryRecord, MemoryRetriever, RelationshipEdge,
    RelationshipNeighbors, SimilarityIndex,
};
use std::collections::HashMap;

struct FixedIndex {
    records: HashMap<String, MemoryRecord>,
    hits: HashMap<String, Vec<(String, f64)>>,
}

impl SimilarityIndex for FixedIndex {
    fn query(&self, query_text: &str, k: usize) -> Vec<(String, f64)> {
        self.hits.get(query_text).cloned().unwrap_or_default().into_iter().take(k).collect()
    }
    fn get(&self, id: &str) -> Option<MemoryRecord> {
        self.records.get(id).cloned()
    }
}

struct FixedEntityIndex;
impl EntityIndex for FixedEntityIndex {
    fn find_entities(&self, message: &str) -> Vec<EntityHit> {
        if message.contains("Acme") {
            vec![EntityHit {
                entity_id: "acme_corp".into(),
                matched_name: "Acme".into(),
                entity_type: "organization".into(),
            }]
        } else {
            vec![]
        }
    }
}

struct FixedNeighbors;
impl RelationshipNeighbors for FixedNeighbors {
    fn neighbors(&self, entity_id: &str, _limit: usize) -> Vec<RelationshipEdge> {
        vec![RelationshipEdge {
            from: entity_id.to_string(),
            relationship: "employs".into(),
            to: "jane_doe".into(),
            confidence: 0.95,
        }]
    }
}

#[test]
fn ontology_extension_adds_connection_block_for_resolved_entity() {
    let now = Utc::now();
    let mut hits = HashMap::new();
    hits.insert("tell me about Acme".to_string(), vec![("acme_corp".to_string(), 0.6)]);
    let mut records = HashMap::new();
    records.insert(
        "acme_corp".to_string(),
        MemoryRecord {
            id: "acme_corp".into(),
            content: "Acme Corporation".into(),
            created_at: Some(now),
            last_accessed: Some(now),
            access_count: 0,
            related_memory_ids: vec![],
            load_bearing: true,
            user_asserted: false,
            confirmed: false,
        },
    );

    let index = FixedIndex { records, hits };
    let retriever = MemoryRetriever::new(
        MemoryConfig::default(),
        Some(Box::new(FixedEntityIndex)),
        Some(Box::new(FixedNeighbors)),
    );
    let outcome = retriever.retrieve(&index, "tell me about Acme", None, now, 0);
    assert!(!outcome.result.emitted.is_empty());
    assert!(outcome
        .result
        .ontology_connections
        .iter()
        .any(|c| c.contains("employs")));
}
