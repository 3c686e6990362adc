//! Everything the core needs to remember between turns, read once at
//! the top of [`crate::core::CognitiveCore::execute`] via the
//! internally-held `Arc<dyn StateReader>` and written back exactly
//! once, as a single `Effect::WriteMemory`, at the end — per
//! `scaffold_core::turn::Turn`'s read/write asymmetry, the core never
//! calls `StateStore::write` directly.

use scaffold_bst::BeliefState;
use scaffold_org::RoleRuntimeState;
use scaffold_supervisor::SteeringMessage;
use scaffold_workflow::WorkflowState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The key `SessionState` is persisted under, within
/// `Scope::Session(session_id)`.
pub const SESSION_STATE_KEY: &str = "cognitive_scaffold_session_state";

/// What the previous turn produced, recorded in a form that survives
/// a serde round trip — `scaffold_workflow::TurnResult` borrows its
/// strings and can't be persisted directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LastTurnOutcome {
    /// Whether the most recent tool call, if any, succeeded.
    pub tool_succeeded: bool,
    /// The turn's rendered output text.
    pub output_text: String,
    /// The most recent tool response's message, if any tool was
    /// called.
    pub last_tool_message: Option<String>,
    /// Files the turn reported touching.
    pub files_touched: Vec<String>,
}

/// Plain, serializable mirror of `scaffold_org::AgentFailureState`
/// (which deliberately carries no serde impl, since the kernel treats
/// it as transient per-call input). The core tracks these scalars
/// itself across turns and rebuilds an `AgentFailureState` from them
/// on each call into the Organization Kernel and Supervisor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FailureCounters {
    /// Consecutive tool-call failures for the most recently used tool.
    pub tool_failures_consecutive: u32,
    /// Total tool-call failures across the whole session, for the
    /// Organization Kernel's SALUTE environment block.
    pub tool_failures_total: u32,
    /// Turns elapsed since the active task last made progress.
    pub turns_since_progress: u32,
    /// Fraction of the context window currently in use, `[0, 1]`.
    pub context_fill_pct: f64,
    /// Set when the last turn ended in an unrecoverable error.
    pub unrecoverable_error: bool,
}

impl FailureCounters {
    /// Builds the live `AgentFailureState` the Organization Kernel and
    /// Supervisor expect, from these persisted scalars.
    pub fn to_agent_failure_state(self) -> scaffold_org::AgentFailureState {
        scaffold_org::AgentFailureState {
            tool_failures_consecutive: self.tool_failures_consecutive,
            turns_since_progress: self.turns_since_progress,
            context_fill_pct: self.context_fill_pct,
            unrecoverable_error: self.unrecoverable_error,
        }
    }
}

/// The full per-session state the core threads across turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// The Belief State Tracker's persisted state, if a domain is
    /// still active.
    pub belief_state: Option<BeliefState>,
    /// The Organization Kernel's runtime state, keyed by role id —
    /// the kernel itself holds none of this (see
    /// `scaffold_org::kernel::RoleRuntimeState`'s own documentation).
    pub role_runtime: BTreeMap<String, RoleRuntimeState>,
    /// Which role is currently active, if the organization selected
    /// one on a prior turn.
    pub active_role_id: Option<String>,
    /// The Graph Workflow Engine's traversal state, if a workflow is
    /// in progress.
    pub workflow_state: Option<WorkflowState>,
    /// What the previous turn produced, used to evaluate this turn's
    /// workflow verification predicate.
    pub last_turn: LastTurnOutcome,
    /// Failure counters carried across turns for PACE and anomaly
    /// detection.
    pub failure_counters: FailureCounters,
    /// Rolling window of recent raw user messages, oldest first,
    /// threaded into BST as continuation-pattern context.
    pub recent_history: Vec<String>,
    /// Steering messages the Supervisor produced last turn, injected
    /// into this turn's context alongside the workflow instruction.
    pub pending_steering: Vec<SteeringMessage>,
    /// How many turns have elapsed since maintenance last ran.
    pub turns_since_maintenance: u32,
    /// Monotonically increasing turn counter for this session.
    pub turn_index: u64,
    /// Fractional task progress as of the last turn, `0.0` resets the
    /// Organization Kernel's stall tracking.
    pub last_progress: f64,
}

impl SessionState {
    /// Caps `recent_history` at `max_len` entries, evicting oldest
    /// first.
    pub fn push_history(&mut self, message: String, max_len: usize) {
        self.recent_history.push(message);
        while self.recent_history.len() > max_len {
            self.recent_history.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_state_is_empty() {
        let state = SessionState::default();
        assert!(state.belief_state.is_none());
        assert!(state.role_runtime.is_empty());
        assert!(state.workflow_state.is_none());
        assert_eq!(state.turn_index, 0);
    }

    #[test]
    fn push_history_evicts_oldest() {
        let mut state = SessionState::default();
        for i in 0..5 {
            state.push_history(format!("msg {i}"), 3);
        }
        assert_eq!(state.recent_history, vec!["msg 2", "msg 3", "msg 4"]);
    }

    #[test]
    fn failure_counters_round_trip_into_agent_failure_state() {
        let counters = FailureCounters {
            tool_failures_consecutive: 3,
            turns_since_progress: 2,
            context_fill_pct: 0.5,
            unrecoverable_error: false,
            ..Default::default()
        };
        let agent_state = counters.to_agent_failure_state();
        assert_eq!(agent_state.tool_failures_consecutive, 3);
        assert_eq!(agent_state.turns_since_progress, 2);
    }

    #[test]
    fn session_state_round_trips_through_json() {
        let mut state = SessionState::default();
        state.turn_index = 7;
        state.push_history("hello".into(), 10);
        let value = serde_json::to_value(&state).unwrap();
        let restored: SessionState = serde_json::from_value(value).unwrap();
        assert_eq!(restored.turn_index, 7);
        assert_eq!(restored.recent_history, vec!["hello".to_string()]);
    }
}
