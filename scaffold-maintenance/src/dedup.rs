//! Deduplication: scans memory pairs above a similarity threshold and
//! decides which survives, honoring validity-tier precedence and the
//! `load_bearing` exemption from auto-deprecation.

use crate::record::{MaintenanceRecord, ValidityTier};
use scaffold_memory::SimilarityIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What a scored-duplicate pair resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupOutcome {
    /// `loser` is superseded by `winner`.
    Resolved {
        /// Record that survives.
        winner: String,
        /// Record that is superseded.
        loser: String,
    },
    /// `winner` would have superseded `flagged`, but `flagged` is
    /// `load_bearing` — flagged for human attention instead.
    FlaggedLoadBearing {
        /// Record that would have won.
        winner: String,
        /// `load_bearing` record that was spared.
        flagged: String,
    },
    /// Both sides are `user_asserted` at the same tier; neither side
    /// auto-wins.
    FlaggedForReview {
        /// First record in the pair.
        a: String,
        /// Second record in the pair.
        b: String,
    },
}

/// A pair found above the similarity threshold, together with its
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupDecision {
    /// The pair's ids, in scan order (not necessarily winner/loser).
    pub pair: (String, String),
    /// Raw similarity score that triggered the scan.
    pub similarity: f64,
    /// What was decided.
    pub outcome: DedupOutcome,
}

fn resolve_pair(a: &MaintenanceRecord, b: &MaintenanceRecord) -> DedupOutcome {
    if a.validity == ValidityTier::UserAsserted && b.validity == ValidityTier::UserAsserted {
        return DedupOutcome::FlaggedForReview {
            a: a.id.clone(),
            b: b.id.clone(),
        };
    }

    let (winner, loser) = if a.validity != b.validity {
        if a.validity > b.validity {
            (a, b)
        } else {
            (b, a)
        }
    } else if a.created_at >= b.created_at {
        (a, b)
    } else {
        (b, a)
    };

    if loser.load_bearing {
        DedupOutcome::FlaggedLoadBearing {
            winner: winner.id.clone(),
            flagged: loser.id.clone(),
        }
    } else {
        DedupOutcome::Resolved {
            winner: winner.id.clone(),
            loser: loser.id.clone(),
        }
    }
}

/// Finds near-duplicate pairs via `index` (self-search each record's
/// content) and resolves each one found, up to `max_pairs`.
pub fn find_and_resolve(records: &[MaintenanceRecord], index: &dyn SimilarityIndex, threshold: f64, max_pairs: usize) -> Vec<DedupDecision> {
    let by_id: std::collections::BTreeMap<&str, &MaintenanceRecord> = records.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut seen_pairs: BTreeSet<(String, String)> = BTreeSet::new();
    let mut decisions = Vec::new();

    for record in records {
        if decisions.len() >= max_pairs {
            break;
        }
        for (candidate_id, similarity) in index.query(&record.content, max_pairs + 1) {
            if candidate_id == record.id || similarity <= threshold {
                continue;
            }
            let key = if record.id < candidate_id {
                (record.id.clone(), candidate_id.clone())
            } else {
                (candidate_id.clone(), record.id.clone())
            };
            if !seen_pairs.insert(key.clone()) {
                continue;
            }
            let Some(other) = by_id.get(candidate_id.as_str()) else {
                continue;
            };
            let outcome = resolve_pair(record, other);
            decisions.push(DedupDecision {
                pair: key,
                similarity,
                outcome,
            });
            if decisions.len() >= max_pairs {
                break;
            }
        }
    }

    decisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Relevance;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;

    struct FixedIndex(HashMap<String, Vec<(String, f64)>>);
    impl SimilarityIndex for FixedIndex {
        fn query(&self, query_text: &str, k: usize) -> Vec<(String, f64)> {
            self.0.get(query_text).cloned().unwrap_or_default().into_iter().take(k).collect()
        }
        fn get(&self, id: &str) -> Option<scaffold_memory::MemoryRecord> {
            let _ = id;
            None
        }
    }

    fn record(id: &str, content: &str, validity: ValidityTier, load_bearing: bool, year: i32) -> MaintenanceRecord {
        MaintenanceRecord {
            id: id.to_string(),
            content: content.to_string(),
            tags: vec![],
            validity,
            load_bearing,
            relevance: Relevance::Active,
            access_count: 0,
            created_at: Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap(),
            created_cycle: 0,
            last_accessed: None,
            related_memory_ids: vec![],
            superseded_by: None,
        }
    }

    #[test]
    fn confirmed_beats_agent_inferred() {
        let records = vec![
            record("a", "the deploy window is 2am UTC", ValidityTier::AgentInferred, false, 2024),
            record("b", "the deploy window is 2am UTC, confirmed", ValidityTier::Confirmed, false, 2024),
        ];
        let mut index = HashMap::new();
        index.insert("the deploy window is 2am UTC".to_string(), vec![("b".to_string(), 0.95)]);
        index.insert("the deploy window is 2am UTC, confirmed".to_string(), vec![("a".to_string(), 0.95)]);
        let decisions = find_and_resolve(&records, &FixedIndex(index), 0.90, 20);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].outcome, DedupOutcome::Resolved { winner: "b".into(), loser: "a".into() });
    }

    #[test]
    fn load_bearing_loser_is_flagged_not_superseded() {
        let records = vec![
            record("a", "x", ValidityTier::Confirmed, false, 2024),
            record("b", "x", ValidityTier::AgentInferred, true, 2023),
        ];
        let mut index = HashMap::new();
        index.insert("x".to_string(), vec![("a".to_string(), 0.95), ("b".to_string(), 0.95)]);
        let decisions = find_and_resolve(&records, &FixedIndex(index), 0.90, 20);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].outcome, DedupOutcome::FlaggedLoadBearing { winner: "a".into(), flagged: "b".into() });
    }

    #[test]
    fn both_user_asserted_conflict_goes_to_review() {
        let records = vec![
            record("a", "x", ValidityTier::UserAsserted, false, 2024),
            record("b", "x", ValidityTier::UserAsserted, false, 2023),
        ];
        let mut index = HashMap::new();
        index.insert("x".to_string(), vec![("a".to_string(), 0.95), ("b".to_string(), 0.95)]);
        let decisions = find_and_resolve(&records, &FixedIndex(index), 0.90, 20);
        assert_eq!(decisions.len(), 1);
        assert!(matches!(decisions[0].outcome, DedupOutcome::FlaggedForReview { .. }));
    }
}
