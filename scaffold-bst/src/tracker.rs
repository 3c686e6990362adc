//! The BST pipeline: underspecified check, domain classification, slot
//! resolution, confidence scoring, and branching into enrich /
//! clarify / passthrough.

use crate::belief_state::{BeliefState, EnrichedMessage};
use crate::config::{DomainSpec, SlotTaxonomy};
use crate::resolver::{run_chain, ResolverInput};
use scaffold_core::outcome::{ComponentDirective, ComponentOutcome};
use serde_json::Value;
use std::collections::BTreeMap;

/// What BST produced for this turn.
#[derive(Debug, Clone, PartialEq)]
pub enum BstOutput {
    /// The message was enriched with task context and a domain
    /// preamble; a belief state was persisted.
    Enriched {
        /// The rendered, three-section message.
        enriched: EnrichedMessage,
        /// The belief state to persist for the next turn.
        belief_state: BeliefState,
    },
    /// A required slot is missing; a clarifying question should be
    /// shown instead of running the original task this turn.
    Clarify {
        /// The question to surface to the user.
        question: String,
        /// The partially filled belief state to persist (domain known,
        /// slot still null), so the next turn can resume resolution.
        belief_state: BeliefState,
    },
    /// Nothing matched confidently enough; the original message passes
    /// through unchanged.
    Passthrough {
        /// The unmodified original message.
        message: String,
    },
}

/// The outcome BST reports to the pipeline: its [`BstOutput`] wrapped
/// with a directive (`NeedsClarification` for `Clarify`, `Proceed`
/// otherwise).
pub type BstOutcome = ComponentOutcome<BstOutput>;

/// Stateless belief tracker: holds the taxonomy, takes state per call.
pub struct BeliefTracker {
    taxonomy: SlotTaxonomy,
}

impl BeliefTracker {
    /// Build a tracker from a loaded taxonomy.
    pub fn new(taxonomy: SlotTaxonomy) -> Self {
        Self { taxonomy }
    }

    /// Process one turn. Never panics and never returns an error to the
    /// caller — on any internal problem this degrades to
    /// [`BstOutput::Passthrough`], per the component's failure
    /// semantics.
    pub fn process(
        &self,
        message: &str,
        recent_history: &[String],
        prior: Option<&BeliefState>,
        turn_index: u64,
    ) -> BstOutcome {
        if !self.taxonomy.enabled {
            return ComponentOutcome::proceed(BstOutput::Passthrough {
                message: message.to_string(),
            });
        }

        if let Some(reused) = self.try_reuse_continuation(message, prior) {
            return self.branch(reused, message, recent_history, turn_index);
        }

        let (domain, trigger_score) = self.classify_domain(message);
        let fresh = BeliefState::new(domain.domain.clone(), BTreeMap::new(), 0.0, 0, turn_index);
        self.branch_fresh(&domain, trigger_score, &fresh, message, recent_history, turn_index)
    }

    fn try_reuse_continuation(&self, message: &str, prior: Option<&BeliefState>) -> Option<BeliefState> {
        let prior = prior?;
        if prior.is_expired() {
            return None;
        }
        let lower = message.to_lowercase();
        let is_continuation = self
            .taxonomy
            .continuation_patterns
            .iter()
            .any(|pattern| lower.contains(pattern.as_str()));
        is_continuation.then(|| prior.clone())
    }

    fn branch(
        &self,
        state: BeliefState,
        message: &str,
        recent_history: &[String],
        turn_index: u64,
    ) -> BstOutcome {
        let Some(domain) = self.taxonomy.domain(&state.domain) else {
            return ComponentOutcome::proceed(BstOutput::Passthrough {
                message: message.to_string(),
            });
        };
        self.branch_fresh(domain, 0.0, &state, message, recent_history, turn_index)
    }

    fn branch_fresh(
        &self,
        domain: &DomainSpec,
        trigger_score: f64,
        base_state: &BeliefState,
        message: &str,
        recent_history: &[String],
        turn_index: u64,
    ) -> BstOutcome {
        let keyword_map: Vec<(String, Value)> = Vec::new();
        let resolver_input = ResolverInput {
            message,
            recent_history,
            belief_state: Some(base_state),
            keyword_map: &keyword_map,
        };

        let mut slots: BTreeMap<String, Option<Value>> = base_state.slots.clone();
        for slot in &domain.slots {
            if matches!(slots.get(&slot.name), Some(Some(_))) {
                continue;
            }
            let resolved = run_chain(&slot.resolver_chain, &resolver_input);
            slots.insert(slot.name.clone(), resolved);
        }

        let required = domain.required_slot_names();
        let candidate = BeliefState::new(
            domain.domain.clone(),
            slots,
            0.0,
            self.taxonomy.belief_state_ttl_turns,
            turn_index,
        );
        let slot_fill_rate = candidate.slot_fill_rate(&required);
        let final_confidence = 0.4 * trigger_score + 0.6 * slot_fill_rate;
        let candidate = BeliefState {
            confidence: final_confidence,
            ..candidate
        };

        if final_confidence >= domain.confidence_threshold {
            let task_context: BTreeMap<String, Value> = candidate
                .slots
                .iter()
                .filter_map(|(k, v)| v.clone().map(|value| (k.clone(), value)))
                .collect();
            let enriched = EnrichedMessage {
                task_context,
                instruction: domain.preamble.clone(),
                original_message: message.to_string(),
            };
            tracing::debug!(
                domain = %domain.domain,
                confidence = final_confidence,
                filled_slots = candidate.slots.values().filter(|v| v.is_some()).count(),
                "belief state enriched message"
            );
            return ComponentOutcome::proceed(BstOutput::Enriched {
                enriched,
                belief_state: candidate,
            });
        }

        if let Some(unfilled) = candidate.first_unfilled_required(&required) {
            let question = domain
                .slot(unfilled)
                .map(|s| s.clarifying_question.clone())
                .unwrap_or_else(|| format!("Could you clarify {unfilled}?"));
            tracing::debug!(domain = %domain.domain, slot = unfilled, "belief state requests clarification");
            return ComponentOutcome::with_directive(
                BstOutput::Clarify {
                    question,
                    belief_state: candidate,
                },
                ComponentDirective::NeedsClarification,
            );
        }

        ComponentOutcome::proceed(BstOutput::Passthrough {
            message: message.to_string(),
        })
    }

    /// Deterministic trigger-keyword classification: score each domain
    /// by the fraction of its trigger keywords present in the message,
    /// pick the highest score with ties broken by taxonomy order, and
    /// fall back to the `conversational` sentinel below the floor.
    fn classify_domain(&self, message: &str) -> (DomainSpec, f64) {
        let lower = message.to_lowercase();
        let mut best: Option<(DomainSpec, f64)> = None;
        for domain in &self.taxonomy.domains {
            if domain.trigger_keywords.is_empty() {
                continue;
            }
            let matched = domain
                .trigger_keywords
                .iter()
                .filter(|kw| lower.contains(kw.to_lowercase().as_str()))
                .count();
            let score = matched as f64 / domain.trigger_keywords.len() as f64;
            if score > 0.0 && best.as_ref().map(|(_, b)| score > *b).unwrap_or(true) {
                best = Some((domain.clone(), score));
            }
        }
        match best {
            Some((domain, score)) if score >= self.taxonomy.minimum_trigger_floor => (domain, score),
            _ => (self.taxonomy.conversational(), 0.0),
        }
    }
}

/// Advance a belief state by one turn, clearing it if it has just
/// expired. Call at the start of the next turn before passing the
/// prior state into [`BeliefTracker::process`].
pub fn tick(state: Option<BeliefState>) -> Option<BeliefState> {
    let decayed = state?.decay();
    if decayed.is_expired() {
        None
    } else {
        Some(decayed)
    }
}

/// Explicit clearing on domain change or clarification rejection, per
/// spec's belief-state lifecycle.
pub fn clear() -> Option<BeliefState> {
    None
}
