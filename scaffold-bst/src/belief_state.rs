//! The persisted belief state and the enriched message it produces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A short-TTL record of "what domain are we in and what slots do we
/// already know", carried across turns so a follow-up like "do that
/// again" doesn't need to re-classify from scratch.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BeliefState {
    /// The classified domain.
    pub domain: String,
    /// Resolved slot values, keyed by slot name. `None` means the slot
    /// is known to the domain but not yet filled.
    pub slots: BTreeMap<String, Option<serde_json::Value>>,
    /// Confidence of the classification that produced this state.
    pub confidence: f64,
    /// Turns remaining before this state expires.
    pub ttl_remaining_turns: u32,
    /// The turn index this state was created on.
    pub created_turn: u64,
}

impl BeliefState {
    /// Construct a freshly classified belief state with a full TTL.
    pub fn new(
        domain: impl Into<String>,
        slots: BTreeMap<String, Option<serde_json::Value>>,
        confidence: f64,
        ttl_turns: u32,
        created_turn: u64,
    ) -> Self {
        Self {
            domain: domain.into(),
            slots,
            confidence,
            ttl_remaining_turns: ttl_turns,
            created_turn,
        }
    }

    /// Decrement the TTL by one turn, floored at zero.
    pub fn decay(&self) -> Self {
        Self {
            ttl_remaining_turns: self.ttl_remaining_turns.saturating_sub(1),
            ..self.clone()
        }
    }

    /// Whether this state has expired and should no longer be reused.
    pub fn is_expired(&self) -> bool {
        self.ttl_remaining_turns == 0
    }

    /// Fraction of required slots that are filled, given the domain's
    /// required slot list. `1.0` if the domain has no required slots.
    pub fn slot_fill_rate(&self, required: &[String]) -> f64 {
        if required.is_empty() {
            return 1.0;
        }
        let filled = required
            .iter()
            .filter(|name| matches!(self.slots.get(*name), Some(Some(_))))
            .count();
        filled as f64 / required.len() as f64
    }

    /// The first required slot that is still unfilled, if any.
    pub fn first_unfilled_required<'a>(&self, required: &'a [String]) -> Option<&'a str> {
        required
            .iter()
            .find(|name| !matches!(self.slots.get(*name), Some(Some(_))))
            .map(|s| s.as_str())
    }
}

/// The outcome of enrichment: a message with task context, instruction
/// preamble, and the original user text stitched together in that
/// fixed order, per the three-section contract.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedMessage {
    /// `[TASK CONTEXT]` section: filled slot key/value pairs.
    pub task_context: BTreeMap<String, serde_json::Value>,
    /// `[INSTRUCTION]` section: the domain's preamble string.
    pub instruction: String,
    /// `[USER MESSAGE]` section: the original text, verbatim.
    pub original_message: String,
}

impl EnrichedMessage {
    /// Render the three labeled sections into the final string sent
    /// downstream, in the fixed order: TASK CONTEXT, INSTRUCTION, USER
    /// MESSAGE.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("[TASK CONTEXT]\n");
        for (key, value) in &self.task_context {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out.push_str(&format!("{key}: {rendered}\n"));
        }
        out.push_str("\n[INSTRUCTION]\n");
        out.push_str(&self.instruction);
        out.push_str("\n\n[USER MESSAGE]\n");
        out.push_str(&self.original_message);
        out
    }
}
