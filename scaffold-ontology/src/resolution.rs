//! Orchestrates the full resolution pipeline over a batch of
//! candidates: block, score pairs within blocks, threshold into
//! auto-merge / review / distinct, take the transitive closure of
//! auto-merges, merge each group, then resolve relationship hints.

use crate::block::block_candidates;
use crate::merge::merge_group;
use crate::relationship::{resolve_relationship_hints, RelationshipEdge};
use crate::score::{score_pair, ScoreWeights};
use crate::types::{EntityCandidate, ResolvedEntity};
use crate::unionfind::UnionFind;
use chrono::{DateTime, Utc};
use scaffold_core::outcome::ComponentOutcome;
use serde::{Deserialize, Serialize};

/// Tunables for the resolution pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Master switch; when `false` every candidate resolves to its
    /// own distinct entity with no scoring pass.
    pub enabled: bool,
    /// Composite score at or above which a pair auto-merges.
    pub merge_threshold: f64,
    /// Composite score at or above which a pair goes to the review
    /// queue instead of being declared distinct outright.
    pub review_threshold: f64,
    /// Per-axis scoring weights.
    pub weights: ScoreWeights,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        ResolutionConfig {
            enabled: true,
            merge_threshold: 0.85,
            review_threshold: 0.60,
            weights: ScoreWeights::default(),
        }
    }
}

/// What a scored pair was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Composite at or above `merge_threshold`.
    AutoMerge,
    /// Composite between `review_threshold` and `merge_threshold`.
    Review,
    /// Composite below `review_threshold`.
    Distinct,
}

/// One audit record per pairwise scoring decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Candidate ids of the scored pair.
    pub candidate_ids: (String, String),
    /// The composite score.
    pub composite: f64,
    /// The resulting decision.
    pub decision: Decision,
    /// When the decision was recorded.
    pub timestamp: DateTime<Utc>,
}

/// A pair awaiting human review, both candidates preserved as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPair {
    /// First candidate's id.
    pub candidate_a: String,
    /// Second candidate's id.
    pub candidate_b: String,
    /// The composite score that put this pair in review.
    pub composite: f64,
}

/// The result of resolving one candidate batch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolutionOutput {
    /// Canonical entities after merge (including untouched
    /// singletons).
    pub resolved: Vec<ResolvedEntity>,
    /// Pairs below merge threshold but at or above review threshold.
    pub review_queue: Vec<ReviewPair>,
    /// Relationship edges created from every merged entity's hints.
    pub relationships: Vec<RelationshipEdge>,
    /// One record per pairwise decision made this cycle.
    pub audit_log: Vec<AuditRecord>,
}

/// Drives resolution over candidate batches; stateless between calls
/// — callers persist [`ResolutionOutput::resolved`] into their own
/// store and pass previously-resolved entities back in as additional
/// candidates on the next batch to extend the transitive closure.
pub struct ResolutionEngine {
    config: ResolutionConfig,
}

impl ResolutionEngine {
    /// Builds an engine with the given configuration.
    pub fn new(config: ResolutionConfig) -> Self {
        ResolutionEngine { config }
    }

    /// Resolves `candidates` into canonical entities and relationship
    /// edges. Never fails outward — candidates that can't be scored
    /// (missing fields) simply score low on the relevant axis and
    /// fall through as distinct.
    pub fn resolve_batch(&self, candidates: Vec<EntityCandidate>, now: DateTime<Utc>) -> ComponentOutcome<ResolutionOutput> {
        if !self.config.enabled || candidates.is_empty() {
            if !self.config.enabled {
                tracing::debug!("resolution disabled, every candidate resolves to itself");
            }
            let resolved = candidates.into_iter().map(|c| merge_group(std::slice::from_ref(&c))).collect();
            return ComponentOutcome::proceed(ResolutionOutput {
                resolved,
                ..Default::default()
            });
        }

        let blocks = block_candidates(&candidates);
        let mut union_find = UnionFind::new(candidates.len());
        let mut review_queue = Vec::new();
        let mut audit_log = Vec::new();

        for block in &blocks {
            for i in 0..block.len() {
                for j in (i + 1)..block.len() {
                    let (a_idx, b_idx) = (block[i], block[j]);
                    let composite = score_pair(&candidates[a_idx], &candidates[b_idx], self.config.weights);
                    let decision = if composite >= self.config.merge_threshold {
                        union_find.union(a_idx, b_idx);
                        Decision::AutoMerge
                    } else if composite >= self.config.review_threshold {
                        tracing::debug!(
                            a = candidates[a_idx].candidate_id,
                            b = candidates[b_idx].candidate_id,
                            composite,
                            "ambiguous pair sent to review"
                        );
                        review_queue.push(ReviewPair {
                            candidate_a: candidates[a_idx].candidate_id.clone(),
                            candidate_b: candidates[b_idx].candidate_id.clone(),
                            composite,
                        });
                        Decision::Review
                    } else {
                        Decision::Distinct
                    };
                    audit_log.push(AuditRecord {
                        candidate_ids: (candidates[a_idx].candidate_id.clone(), candidates[b_idx].candidate_id.clone()),
                        composite,
                        decision,
                        timestamp: now,
                    });
                }
            }
        }

        let mut resolved: Vec<ResolvedEntity> = union_find
            .groups()
            .into_iter()
            .map(|indices| {
                let group: Vec<EntityCandidate> = indices.into_iter().map(|i| candidates[i].clone()).collect();
                merge_group(&group)
            })
            .collect();

        let known = resolved.clone();
        let mut relationships = Vec::new();
        for entity in &mut resolved {
            let hints: Vec<_> = candidates
                .iter()
                .filter(|c| entity.provenance_chain.iter().any(|p| p.record_id == c.provenance.record_id))
                .flat_map(|c| c.relationship_hints.clone())
                .collect();
            if !hints.is_empty() {
                relationships.extend(resolve_relationship_hints(&entity.entity_id, &hints, &known));
            }
        }

        ComponentOutcome::proceed(ResolutionOutput {
            resolved,
            review_queue,
            relationships,
            audit_log,
        })
    }
}
