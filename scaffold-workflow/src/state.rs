//! Traversal state held across turns for one in-progress workflow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single recorded traversal event, the canonical source SALUTE
/// reads `activity.step`, `progress`, and `current_tool` from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalEvent {
    /// The node this event concerns.
    pub node_id: String,
    /// What kind of event this is (`entry`, `verify`, `retry`,
    /// `escalate`, `checkpoint`, `exit`), as a free-form tag since the
    /// set is small and purely descriptive.
    pub kind: String,
    /// Turn index the event was recorded on.
    pub turn_index: u64,
}

/// Held across turns once a workflow has been selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Which workflow this state belongs to.
    pub workflow_id: String,
    /// Node traversal is currently sitting at.
    pub current_node: String,
    /// Nodes visited so far, in order (may repeat on retry loops).
    pub visited: Vec<String>,
    /// Retry counters, keyed by node id.
    pub retry_count_by_node: BTreeMap<String, u32>,
    /// Append-only event log for this traversal.
    pub event_log: Vec<TraversalEvent>,
    /// Total steps known for this workflow's graph, cached for
    /// SALUTE's `activity.total_steps`.
    pub total_steps: u32,
}

impl WorkflowState {
    /// Begins a fresh traversal at `start_node`.
    pub fn new(workflow_id: impl Into<String>, start_node: impl Into<String>, total_steps: u32) -> Self {
        let start_node = start_node.into();
        WorkflowState {
            workflow_id: workflow_id.into(),
            current_node: start_node.clone(),
            visited: vec![start_node],
            retry_count_by_node: BTreeMap::new(),
            event_log: Vec::new(),
            total_steps,
        }
    }

    /// Records an event and moves `current_node` to `to`.
    pub fn advance(&mut self, to: impl Into<String>, event_kind: &str, turn_index: u64) {
        let to = to.into();
        self.event_log.push(TraversalEvent {
            node_id: self.current_node.clone(),
            kind: event_kind.to_string(),
            turn_index,
        });
        self.current_node = to.clone();
        self.visited.push(to);
    }

    /// Increments the retry counter for the current node and returns
    /// the new count.
    pub fn bump_retry(&mut self, node_id: &str) -> u32 {
        let count = self.retry_count_by_node.entry(node_id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// How many steps have been visited so far, for `progress`.
    pub fn steps_completed(&self) -> u32 {
        self.visited.len().saturating_sub(1) as u32
    }
}
