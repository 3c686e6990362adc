//! Adapter wiring `scaffold-ontology`'s resolved entities and
//! relationship edges into the trait objects `scaffold-memory`'s
//! retrieval pass expects.
//!
//! `scaffold_ontology::RelationshipEdge` carries a `resolved: bool`
//! flag the resolution engine needs internally; `scaffold-memory`'s
//! own [`scaffold_memory::RelationshipEdge`] has no such field — it
//! only ever sees edges that already resolved. This store is the one
//! place that conversion happens.

use scaffold_memory::{EntityHit, EntityIndex, RelationshipEdge as MemoryEdge, RelationshipNeighbors};
use scaffold_ontology::{RelationshipEdge as OntologyEdge, ResolvedEntity};
use std::sync::{Arc, Mutex};

/// In-process store of resolved entities and relationship edges,
/// populated by [`crate::core::CognitiveCore`]'s own resolution engine
/// as entity candidates are ingested turn by turn.
///
/// Holds plain `Mutex`-guarded vectors rather than an index structure
/// — entity/relationship volumes in a single cognitive-scaffolding
/// session are small enough that linear scans over `find_entities`
/// and `neighbors` are cheap, and a richer index is a concern for a
/// persistence layer this crate doesn't own.
#[derive(Debug, Default)]
pub struct OntologyStore {
    entities: Mutex<Vec<ResolvedEntity>>,
    relationships: Mutex<Vec<OntologyEdge>>,
}

impl OntologyStore {
    /// An empty store.
    pub fn new() -> Self {
        OntologyStore::default()
    }

    /// Merges freshly resolved entities in, replacing any existing
    /// entity with the same `entity_id`.
    pub fn ingest_entities(&self, resolved: Vec<ResolvedEntity>) {
        let mut entities = self.entities.lock().expect("ontology store entities poisoned");
        for entity in resolved {
            entities.retain(|existing| existing.entity_id != entity.entity_id);
            entities.push(entity);
        }
    }

    /// Appends freshly resolved relationship edges.
    pub fn ingest_relationships(&self, edges: Vec<OntologyEdge>) {
        self.relationships
            .lock()
            .expect("ontology store relationships poisoned")
            .extend(edges);
    }

    /// Snapshot of every resolved entity.
    pub fn entities(&self) -> Vec<ResolvedEntity> {
        self.entities.lock().expect("ontology store entities poisoned").clone()
    }

    /// Snapshot of every relationship edge, resolved and unresolved.
    pub fn relationship_edges(&self) -> Vec<OntologyEdge> {
        self.relationships.lock().expect("ontology store relationships poisoned").clone()
    }

    /// Wholesale replacement of the relationship edge set, used after a
    /// maintenance cycle recomputes confidence and drops edges pointing
    /// at superseded entities.
    pub fn replace_relationship_edges(&self, edges: Vec<OntologyEdge>) {
        *self.relationships.lock().expect("ontology store relationships poisoned") = edges;
    }
}

impl EntityIndex for OntologyStore {
    fn find_entities(&self, message: &str) -> Vec<EntityHit> {
        let lower = message.to_lowercase();
        let entities = self.entities.lock().expect("ontology store entities poisoned");
        entities
            .iter()
            .filter(|e| e.superseded_by.is_none())
            .filter_map(|e| {
                let matched = e
                    .aliases
                    .iter()
                    .find(|alias| lower.contains(alias.to_lowercase().as_str()))?;
                Some(EntityHit {
                    entity_id: e.entity_id.clone(),
                    matched_name: matched.clone(),
                    entity_type: e.entity_type.clone(),
                })
            })
            .collect()
    }
}

impl RelationshipNeighbors for OntologyStore {
    fn neighbors(&self, entity_id: &str, limit: usize) -> Vec<MemoryEdge> {
        let relationships = self.relationships.lock().expect("ontology store relationships poisoned");
        relationships
            .iter()
            .filter(|edge| edge.resolved && edge.from == entity_id)
            .take(limit)
            .map(|edge| MemoryEdge {
                from: edge.from.clone(),
                relationship: edge.relationship.clone(),
                to: edge.to.clone(),
                confidence: edge.confidence,
            })
            .collect()
    }
}

// `MemoryRetriever` takes ownership of boxed trait objects, but the
// core also needs its own handle to ingest freshly resolved entities
// — this local wrapper delegates through the `Arc` so one store backs
// both (the orphan rules don't allow implementing a foreign trait
// directly for `Arc<OntologyStore>`, since `Arc` is foreign too).
#[derive(Debug, Clone)]
pub struct SharedOntologyStore(pub Arc<OntologyStore>);

impl EntityIndex for SharedOntologyStore {
    fn find_entities(&self, message: &str) -> Vec<EntityHit> {
        self.0.find_entities(message)
    }
}

impl RelationshipNeighbors for SharedOntologyStore {
    fn neighbors(&self, entity_id: &str, limit: usize) -> Vec<MemoryEdge> {
        self.0.neighbors(entity_id, limit)
    }
}
