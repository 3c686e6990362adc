//! The retrieval pipeline: merge multi-variant similarity results,
//! score with temporal decay, boost related memories, select top-k,
//! and track access + co-retrieval.

use crate::config::MemoryConfig;
use crate::decay::{decay_weighted_score, recency_score, DecayExemptions};
use crate::ontology_ext::{render_connection, EntityIndex, RelationshipNeighbors};
use crate::query::expand_queries;
use chrono::{DateTime, Utc};
use scaffold_core::outcome::ComponentOutcome;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

/// A memory as the similarity backend and the caller's store see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique memory id.
    pub id: String,
    /// The stored content, injected verbatim into the model's context
    /// when emitted.
    pub content: String,
    /// When the memory was created, if known.
    pub created_at: Option<DateTime<Utc>>,
    /// When the memory was last accessed, if known.
    pub last_accessed: Option<DateTime<Utc>>,
    /// How many times this memory has been emitted.
    pub access_count: u64,
    /// Ids of memories this one is related to, read for the
    /// related-boost pass.
    pub related_memory_ids: Vec<String>,
    /// `lineage.utility == load_bearing` decay exemption.
    pub load_bearing: bool,
    /// `lineage.source == user_asserted` decay exemption.
    pub user_asserted: bool,
    /// `lineage.validity == confirmed` decay exemption.
    pub confirmed: bool,
}

/// A backend capable of similarity search and record lookup. Kept
/// trait-object so this crate never commits to a particular vector
/// store or embedding model.
pub trait SimilarityIndex: Send + Sync {
    /// Returns up to `k` `(memory_id, similarity)` pairs most similar
    /// to `query_text`.
    fn query(&self, query_text: &str, k: usize) -> Vec<(String, f64)>;

    /// Fetches a record by id, if it still exists.
    fn get(&self, id: &str) -> Option<MemoryRecord>;
}

/// A scored candidate at some point in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCandidate {
    /// The underlying record.
    pub record: MemoryRecord,
    /// Maximum similarity seen across query variants.
    pub similarity: f64,
    /// Decay-weighted score before any related-boost.
    pub final_score: f64,
}

/// A logged retrieval cycle, FIFO-evicted past
/// [`MemoryConfig::co_retrieval_log_max_entries`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoRetrievalEntry {
    /// When the cycle ran.
    pub timestamp: DateTime<Utc>,
    /// The BST domain active for this cycle, if any.
    pub domain: Option<String>,
    /// Ids of memories emitted this cycle.
    pub emitted_memory_ids: Vec<String>,
    /// The caller-supplied cycle counter.
    pub cycle: u64,
}

/// What the Memory Enhancement component reports for a turn.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrievalOutput {
    /// The final emitted memories, already decay- and boost-scored.
    pub emitted: Vec<MemoryCandidate>,
    /// Rendered `Known connections: ...` blocks from the
    /// ontology-aware extension.
    pub ontology_connections: Vec<String>,
}

/// Owns the co-retrieval log and drives the full retrieval pipeline.
pub struct MemoryRetriever {
    config: MemoryConfig,
    entity_index: Option<Box<dyn EntityIndex>>,
    relationship_neighbors: Option<Box<dyn RelationshipNeighbors>>,
    co_retrieval_log: Mutex<VecDeque<CoRetrievalEntry>>,
}

impl MemoryRetriever {
    /// Builds a retriever with optional ontology-aware extension
    /// backends; omit either to run retrieval without it.
    pub fn new(
        config: MemoryConfig,
        entity_index: Option<Box<dyn EntityIndex>>,
        relationship_neighbors: Option<Box<dyn RelationshipNeighbors>>,
    ) -> Self {
        MemoryRetriever {
            config,
            entity_index,
            relationship_neighbors,
            co_retrieval_log: Mutex::new(VecDeque::new()),
        }
    }

    /// Runs the full retrieval pipeline for one turn. Never fails
    /// outward — a query that returns nothing is a normal, empty
    /// result, not an error.
    pub fn retrieve(
        &self,
        index: &dyn SimilarityIndex,
        message: &str,
        domain: Option<&str>,
        now: DateTime<Utc>,
        cycle: u64,
    ) -> ComponentOutcome<RetrievalOutput> {
        if !self.config.enabled {
            return ComponentOutcome::proceed(RetrievalOutput::default());
        }

        let mut best_similarity: BTreeMap<String, f64> = BTreeMap::new();

        for variant in expand_queries(message, domain, self.config.max_keyword_tokens) {
            for (id, sim) in index.query(&variant.text, self.config.retrieval_k_per_variant) {
                let entry = best_similarity.entry(id).or_insert(sim);
                if sim > *entry {
                    *entry = sim;
                }
            }
        }

        let mut entity_hits = Vec::new();
        if self.config.ontology_extension_enabled {
            if let Some(entity_index) = &self.entity_index {
                entity_hits = entity_index.find_entities(message);
                for hit in &entity_hits {
                    let queries = [
                        format!("relationships of {}", hit.matched_name),
                        format!("{} connected to {}", hit.entity_type, hit.matched_name),
                    ];
                    for q in queries {
                        for (id, sim) in index.query(&q, self.config.retrieval_k_per_variant) {
                            let entry = best_similarity.entry(id).or_insert(sim);
                            if sim > *entry {
                                *entry = sim;
                            }
                        }
                    }
                }
            }
        }

        let mut candidates: Vec<MemoryCandidate> = best_similarity
            .into_iter()
            .filter_map(|(id, similarity)| {
                let record = index.get(&id)?;
                let final_score = self.score(&record, similarity, now);
                Some(MemoryCandidate {
                    record,
                    similarity,
                    final_score,
                })
            })
            .collect();

        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

        let top_k: Vec<String> = candidates
            .iter()
            .take(self.config.max_injected)
            .map(|c| c.record.id.clone())
            .collect();

        let related_ids: Vec<String> = candidates
            .iter()
            .filter(|c| top_k.contains(&c.record.id))
            .flat_map(|c| c.record.related_memory_ids.clone())
            .collect();

        for candidate in &mut candidates {
            if related_ids.contains(&candidate.record.id) && !top_k.contains(&candidate.record.id) {
                candidate.final_score += self.config.related_boost;
            }
        }
        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        candidates.truncate(self.config.max_injected);

        for candidate in &mut candidates {
            candidate.record.access_count += 1;
            candidate.record.last_accessed = Some(now);
        }

        let emitted_ids: Vec<String> = candidates.iter().map(|c| c.record.id.clone()).collect();
        self.log_co_retrieval(CoRetrievalEntry {
            timestamp: now,
            domain: domain.map(str::to_string),
            emitted_memory_ids: emitted_ids.clone(),
            cycle,
        });

        let ontology_connections = self.render_ontology_connections(&entity_hits, &emitted_ids);

        ComponentOutcome::proceed(RetrievalOutput {
            emitted: candidates,
            ontology_connections,
        })
    }

    fn score(&self, record: &MemoryRecord, similarity: f64, now: DateTime<Utc>) -> f64 {
        let exemptions = DecayExemptions {
            load_bearing: record.load_bearing,
            user_asserted: record.user_asserted,
            confirmed: record.confirmed,
        };
        let recency = match record.last_accessed.or(record.created_at) {
            Some(reference) => {
                let age_hours = (now - reference).num_seconds() as f64 / 3600.0;
                recency_score(
                    age_hours.max(0.0),
                    self.config.half_life_hours,
                    self.config.min_recency_score,
                    exemptions,
                )
            }
            None => 1.0,
        };
        decay_weighted_score(similarity, recency, self.config.decay_weight)
    }

    fn render_ontology_connections(
        &self,
        entity_hits: &[crate::ontology_ext::EntityHit],
        emitted_ids: &[String],
    ) -> Vec<String> {
        let Some(neighbors) = &self.relationship_neighbors else {
            return Vec::new();
        };
        entity_hits
            .iter()
            .filter(|hit| emitted_ids.contains(&hit.entity_id))
            .flat_map(|hit| neighbors.neighbors(&hit.entity_id, self.config.max_relationship_neighbors))
            .map(|edge| render_connection(&edge))
            .collect()
    }

    fn log_co_retrieval(&self, entry: CoRetrievalEntry) {
        let mut log = self.co_retrieval_log.lock().expect("co-retrieval log poisoned");
        if log.len() >= self.config.co_retrieval_log_max_entries {
            log.pop_front();
        }
        log.push_back(entry);
    }

    /// Snapshot of the co-retrieval log, oldest first.
    pub fn co_retrieval_log(&self) -> Vec<CoRetrievalEntry> {
        self.co_retrieval_log.lock().expect("co-retrieval log poisoned").iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeIndex {
        records: HashMap<String, MemoryRecord>,
        hits: HashMap<String, Vec<(String, f64)>>,
    }

    impl SimilarityIndex for FakeIndex {
        fn query(&self, query_text: &str, k: usize) -> Vec<(String, f64)> {
            self.hits
                .get(query_text)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .take(k)
                .collect()
        }

        fn get(&self, id: &str) -> Option<MemoryRecord> {
            self.records.get(id).cloned()
        }
    }

    fn record(id: &str, age_hours: f64, now: DateTime<Utc>, related: Vec<&str>) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            content: format!("content for {id}"),
            created_at: Some(now - chrono::Duration::hours(age_hours as i64)),
            last_accessed: Some(now - chrono::Duration::hours(age_hours as i64)),
            access_count: 0,
            related_memory_ids: related.into_iter().map(str::to_string).collect(),
            load_bearing: false,
            user_asserted: false,
            confirmed: false,
        }
    }

    #[test]
    fn merges_by_max_similarity_across_variants() {
        let now = Utc::now();
        let mut hits = HashMap::new();
        hits.insert("fix the login bug".to_string(), vec![("m1".to_string(), 0.4)]);
        hits.insert("fix login bug".to_string(), vec![("m1".to_string(), 0.9)]);
        let mut records = HashMap::new();
        records.insert("m1".to_string(), record("m1", 1.0, now, vec![]));

        let index = FakeIndex { records, hits };
        let retriever = MemoryRetriever::new(MemoryConfig::default(), None, None);
        let outcome = retriever.retrieve(&index, "fix the login bug", None, now, 0);
        assert_eq!(outcome.result.emitted[0].similarity, 0.9);
    }

    #[test]
    fn disabled_config_returns_empty() {
        let now = Utc::now();
        let index = FakeIndex {
            records: HashMap::new(),
            hits: HashMap::new(),
        };
        let config = MemoryConfig {
            enabled: false,
            ..Default::default()
        };
        let retriever = MemoryRetriever::new(config, None, None);
        let outcome = retriever.retrieve(&index, "anything", None, now, 0);
        assert!(outcome.result.emitted.is_empty());
    }

    #[test]
    fn access_count_and_last_accessed_update_on_emission() {
        let now = Utc::now();
        let mut hits = HashMap::new();
        hits.insert("ping".to_string(), vec![("m1".to_string(), 0.5)]);
        let mut records = HashMap::new();
        records.insert("m1".to_string(), record("m1", 500.0, now, vec![]));

        let index = FakeIndex { records, hits };
        let retriever = MemoryRetriever::new(MemoryConfig::default(), None, None);
        let outcome = retriever.retrieve(&index, "ping", None, now, 0);
        let emitted = &outcome.result.emitted[0];
        assert_eq!(emitted.record.access_count, 1);
        assert_eq!(emitted.record.last_accessed, Some(now));
    }

    #[test]
    fn load_bearing_memory_ignores_age_in_scoring() {
        let now = Utc::now();
        let mut hits = HashMap::new();
        hits.insert("q".to_string(), vec![("old".to_string(), 0.5), ("fresh".to_string(), 0.5)]);
        let mut old = record("old", 10_000.0, now, vec![]);
        old.load_bearing = true;
        let fresh = record("fresh", 10_000.0, now, vec![]);
        let mut records = HashMap::new();
        records.insert("old".to_string(), old);
        records.insert("fresh".to_string(), fresh);

        let index = FakeIndex { records, hits };
        let retriever = MemoryRetriever::new(MemoryConfig::default(), None, None);
        let outcome = retriever.retrieve(&index, "q", None, now, 0);
        let old_score = outcome.result.emitted.iter().find(|c| c.record.id == "old").unwrap().final_score;
        let fresh_score = outcome.result.emitted.iter().find(|c| c.record.id == "fresh").unwrap().final_score;
        assert!(old_score > fresh_score);
    }

    #[test]
    fn co_retrieval_log_records_cycle() {
        let now = Utc::now();
        let mut hits = HashMap::new();
        hits.insert("q".to_string(), vec![("m1".to_string(), 0.5)]);
        let mut records = HashMap::new();
        records.insert("m1".to_string(), record("m1", 1.0, now, vec![]));

        let index = FakeIndex { records, hits };
        let retriever = MemoryRetriever::new(MemoryConfig::default(), None, None);
        retriever.retrieve(&index, "q", None, now, 7);
        let log = retriever.co_retrieval_log();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].cycle, 7);
        assert_eq!(log[0].emitted_memory_ids, vec!["m1".to_string()]);
    }
}
