//! The traversal engine: selects a workflow, advances state by at
//! most one "turn boundary" per call, and reports the instruction to
//! inject plus the events produced along the way.

use crate::graph::{EdgeKind, NodeKind, VerificationPredicate, Workflow};
use crate::state::{TraversalEvent, WorkflowState};
use regex::Regex;
use scaffold_core::outcome::ComponentOutcome;
use serde::{Deserialize, Serialize};

/// What the previous turn produced, used to evaluate a `task` node's
/// verification predicate.
#[derive(Debug, Clone, Default)]
pub struct TurnResult<'a> {
    /// Whether the most recent tool call (if any) succeeded.
    pub tool_succeeded: bool,
    /// The turn's rendered output text.
    pub output_text: &'a str,
    /// The most recent tool response's message, if any tool was
    /// called this turn — what `OutputMatches` regexes run against.
    pub last_tool_message: Option<&'a str>,
    /// Files the turn reports having touched.
    pub files_touched: &'a [String],
}

/// Chooses which workflow applies to `domain`, honoring an optional
/// role workflow whitelist, tie-broken by position in `library`.
pub fn select_workflow<'a>(
    library: &'a [Workflow],
    domain: &str,
    role_whitelist: Option<&[String]>,
) -> Option<&'a Workflow> {
    library.iter().find(|w| {
        w.trigger_domains.iter().any(|d| d == domain)
            && role_whitelist
                .map(|wl| wl.iter().any(|id| id == &w.workflow_id))
                .unwrap_or(true)
    })
}

/// What the Graph Workflow Engine hands back to the pipeline for a
/// single turn.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowOutput {
    /// Which workflow is active, if any.
    pub workflow_id: Option<String>,
    /// The node traversal landed on this turn.
    pub current_node: Option<String>,
    /// Instruction text to inject into the turn, if the landed node
    /// is a `task`.
    pub instruction: Option<String>,
    /// Fractional progress, `steps_completed / total_steps`.
    pub progress: f64,
    /// Events recorded during this call's auto-advance.
    pub events_this_turn: Vec<TraversalEvent>,
    /// Set when an `escalate` node was traversed — the caller should
    /// raise PACE by one tier.
    pub pace_escalation_requested: bool,
    /// Updated traversal state to persist, `None` once terminated.
    pub state: Option<WorkflowState>,
}

const MAX_AUTO_ADVANCE: usize = 64;

/// Holds the workflow library and drives traversal.
pub struct WorkflowEngine {
    library: Vec<Workflow>,
}

impl WorkflowEngine {
    /// Builds an engine over a fixed workflow library.
    pub fn new(library: Vec<Workflow>) -> Self {
        WorkflowEngine { library }
    }

    /// Advances traversal by one turn boundary: if `prior` exists,
    /// verify the node it was sitting at and advance off it; then
    /// auto-advance through any `start`/`decision`/`escalate`/
    /// `checkpoint` nodes until landing on a `task` (injects an
    /// instruction and waits) or `exit` (terminates).
    ///
    /// Never errors outward: a missing library, no matching workflow,
    /// or a malformed graph all degrade to an inert, no-instruction
    /// outcome so the BST-enriched message alone reaches the model.
    pub fn process(
        &self,
        domain: &str,
        role_whitelist: Option<&[String]>,
        prior: Option<WorkflowState>,
        turn_result: TurnResult<'_>,
        turn_index: u64,
    ) -> ComponentOutcome<WorkflowOutput> {
        let workflow = match &prior {
            Some(state) => match self.library.iter().find(|w| w.workflow_id == state.workflow_id) {
                Some(w) => w,
                None => return ComponentOutcome::proceed(WorkflowOutput::default()),
            },
            None => match select_workflow(&self.library, domain, role_whitelist) {
                Some(w) => w,
                None => {
                    tracing::debug!(domain, "no workflow matches, passthrough");
                    return ComponentOutcome::proceed(WorkflowOutput::default());
                }
            },
        };

        let mut state = match prior {
            Some(s) => s,
            None => match workflow.start_node() {
                Some(start) => WorkflowState::new(
                    workflow.workflow_id.clone(),
                    start.node_id.clone(),
                    workflow.nodes.len() as u32,
                ),
                None => {
                    tracing::warn!(workflow_id = %workflow.workflow_id, "malformed graph: no single start node");
                    return ComponentOutcome::proceed(WorkflowOutput::default());
                }
            },
        };

        let mut events_this_turn = Vec::new();

        // A freshly created state always sits at the `start` node, so
        // this only fires when resuming a traversal parked at a task
        // awaiting its verification.
        if let Some(node) = workflow.node(&state.current_node) {
            if let NodeKind::Task {
                verification,
                max_retries,
                ..
            } = &node.kind
            {
                let passed = verify(verification, &turn_result);
                events_this_turn.push(TraversalEvent {
                    node_id: node.node_id.clone(),
                    kind: "verify".into(),
                    turn_index,
                });
                let retry_count = *state.retry_count_by_node.get(&node.node_id).unwrap_or(&0);
                let eligible = if passed {
                    vec![EdgeKind::OnSuccess]
                } else if retry_count < *max_retries {
                    vec![EdgeKind::OnRetry, EdgeKind::OnFail, EdgeKind::Always]
                } else {
                    vec![EdgeKind::OnExhaust, EdgeKind::OnFail, EdgeKind::Always]
                };
                if let Some(edge) = node.next_edge(&eligible) {
                    if edge.kind == EdgeKind::OnRetry {
                        state.bump_retry(&node.node_id);
                        events_this_turn.push(TraversalEvent {
                            node_id: node.node_id.clone(),
                            kind: "retry".into(),
                            turn_index,
                        });
                    }
                    let to = edge.to.clone();
                    state.advance(to, "entry", turn_index);
                }
            }
        }

        let mut pace_escalation_requested = false;
        let mut iterations = 0;
        loop {
            iterations += 1;
            if iterations > MAX_AUTO_ADVANCE {
                tracing::warn!(workflow_id = %workflow.workflow_id, "auto-advance exceeded bound, aborting traversal");
                return ComponentOutcome::proceed(WorkflowOutput::default());
            }
            let node = match workflow.node(&state.current_node) {
                Some(n) => n,
                None => return ComponentOutcome::proceed(WorkflowOutput::default()),
            };
            match &node.kind {
                NodeKind::Start => {
                    let Some(edge) = node.next_edge(&[EdgeKind::Always]) else {
                        return ComponentOutcome::proceed(WorkflowOutput::default());
                    };
                    let to = edge.to.clone();
                    state.advance(to, "entry", turn_index);
                }
                NodeKind::Decision { predicate } => {
                    let passed = verify(predicate, &turn_result);
                    events_this_turn.push(TraversalEvent {
                        node_id: node.node_id.clone(),
                        kind: "decision".into(),
                        turn_index,
                    });
                    let eligible = if passed {
                        vec![EdgeKind::OnSuccess, EdgeKind::Always]
                    } else {
                        vec![EdgeKind::OnFail, EdgeKind::Always]
                    };
                    let Some(edge) = node.next_edge(&eligible) else {
                        return ComponentOutcome::proceed(WorkflowOutput::default());
                    };
                    let to = edge.to.clone();
                    state.advance(to, "entry", turn_index);
                }
                NodeKind::Escalate => {
                    events_this_turn.push(TraversalEvent {
                        node_id: node.node_id.clone(),
                        kind: "escalate".into(),
                        turn_index,
                    });
                    pace_escalation_requested = true;
                    let Some(edge) = node.next_edge(&[EdgeKind::Always]) else {
                        return ComponentOutcome::proceed(WorkflowOutput::default());
                    };
                    let to = edge.to.clone();
                    state.advance(to, "entry", turn_index);
                }
                NodeKind::Checkpoint => {
                    events_this_turn.push(TraversalEvent {
                        node_id: node.node_id.clone(),
                        kind: "checkpoint".into(),
                        turn_index,
                    });
                    let Some(edge) = node.next_edge(&[EdgeKind::Always]) else {
                        return ComponentOutcome::proceed(WorkflowOutput::default());
                    };
                    let to = edge.to.clone();
                    state.advance(to, "entry", turn_index);
                }
                NodeKind::Task { instruction, .. } => {
                    events_this_turn.push(TraversalEvent {
                        node_id: node.node_id.clone(),
                        kind: "entry".into(),
                        turn_index,
                    });
                    let progress = if state.total_steps > 0 {
                        state.steps_completed() as f64 / state.total_steps as f64
                    } else {
                        0.0
                    };
                    return ComponentOutcome::proceed(WorkflowOutput {
                        workflow_id: Some(workflow.workflow_id.clone()),
                        current_node: Some(state.current_node.clone()),
                        instruction: Some(instruction.clone()),
                        progress,
                        events_this_turn,
                        pace_escalation_requested,
                        state: Some(state),
                    });
                }
                NodeKind::Exit => {
                    events_this_turn.push(TraversalEvent {
                        node_id: node.node_id.clone(),
                        kind: "exit".into(),
                        turn_index,
                    });
                    return ComponentOutcome::proceed(WorkflowOutput {
                        workflow_id: Some(workflow.workflow_id.clone()),
                        current_node: Some(state.current_node.clone()),
                        instruction: None,
                        progress: 1.0,
                        events_this_turn,
                        pace_escalation_requested,
                        state: None,
                    });
                }
            }
        }
    }
}

fn verify(predicate: &VerificationPredicate, turn: &TurnResult<'_>) -> bool {
    match predicate {
        VerificationPredicate::ToolSucceeded => turn.tool_succeeded,
        VerificationPredicate::OutputMatches { pattern } => match Regex::new(pattern) {
            Ok(re) => turn.last_tool_message.is_some_and(|msg| re.is_match(msg)),
            Err(err) => {
                tracing::warn!(pattern, %err, "malformed OutputMatches regex, treating as unmatched");
                false
            }
        },
        VerificationPredicate::FileExists { path } => turn.files_touched.iter().any(|f| f == path),
        VerificationPredicate::Always => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeCondition, Node};

    fn bugfix_workflow() -> Workflow {
        Workflow {
            workflow_id: "bugfix_workflow".into(),
            trigger_domains: vec!["bugfix".into()],
            nodes: vec![
                Node {
                    node_id: "start".into(),
                    kind: NodeKind::Start,
                    edges: vec![EdgeCondition {
                        kind: EdgeKind::Always,
                        to: "reproduce".into(),
                    }],
                },
                Node {
                    node_id: "reproduce".into(),
                    kind: NodeKind::Task {
                        instruction: "Reproduce the reported bug.".into(),
                        verification: VerificationPredicate::ToolSucceeded,
                        max_retries: 2,
                    },
                    edges: vec![
                        EdgeCondition {
                            kind: EdgeKind::OnSuccess,
                            to: "fix".into(),
                        },
                        EdgeCondition {
                            kind: EdgeKind::OnRetry,
                            to: "reproduce".into(),
                        },
                        EdgeCondition {
                            kind: EdgeKind::OnExhaust,
                            to: "escalate_node".into(),
                        },
                    ],
                },
                Node {
                    node_id: "fix".into(),
                    kind: NodeKind::Task {
                        instruction: "Apply the fix.".into(),
                        verification: VerificationPredicate::FileExists {
                            path: "fixed.rs".into(),
                        },
                        max_retries: 1,
                    },
                    edges: vec![
                        EdgeCondition {
                            kind: EdgeKind::OnSuccess,
                            to: "done".into(),
                        },
                        EdgeCondition {
                            kind: EdgeKind::OnFail,
                            to: "escalate_node".into(),
                        },
                    ],
                },
                Node {
                    node_id: "escalate_node".into(),
                    kind: NodeKind::Escalate,
                    edges: vec![EdgeCondition {
                        kind: EdgeKind::Always,
                        to: "done".into(),
                    }],
                },
                Node {
                    node_id: "done".into(),
                    kind: NodeKind::Exit,
                    edges: vec![],
                },
            ],
        }
    }

    #[test]
    fn fresh_selection_lands_on_first_task() {
        let engine = WorkflowEngine::new(vec![bugfix_workflow()]);
        let outcome = engine.process("bugfix", None, None, TurnResult::default(), 0);
        assert_eq!(outcome.result.current_node.as_deref(), Some("reproduce"));
        assert!(outcome.result.instruction.is_some());
    }

    #[test]
    fn success_advances_to_next_task() {
        let engine = WorkflowEngine::new(vec![bugfix_workflow()]);
        let first = engine.process("bugfix", None, None, TurnResult::default(), 0);
        let turn = TurnResult {
            tool_succeeded: true,
            output_text: "",
            last_tool_message: None,
            files_touched: &[],
        };
        let second = engine.process("bugfix", None, first.result.state, turn, 1);
        assert_eq!(second.result.current_node.as_deref(), Some("fix"));
    }

    #[test]
    fn retry_then_exhaust_escalates() {
        let engine = WorkflowEngine::new(vec![bugfix_workflow()]);
        let mut state = engine
            .process("bugfix", None, None, TurnResult::default(), 0)
            .result
            .state;
        let failing = TurnResult {
            tool_succeeded: false,
            output_text: "",
            last_tool_message: None,
            files_touched: &[],
        };
        // Two retries, then exhaust (max_retries = 2).
        for turn_index in 1..=3 {
            let out = engine.process("bugfix", None, state, failing.clone(), turn_index);
            state = out.result.state;
        }
        assert_eq!(state.as_ref().map(|s| s.current_node.as_str()), Some("done"));
    }

    #[test]
    fn unmatched_domain_is_inert() {
        let engine = WorkflowEngine::new(vec![bugfix_workflow()]);
        let outcome = engine.process("codegen", None, None, TurnResult::default(), 0);
        assert!(outcome.result.workflow_id.is_none());
        assert_eq!(outcome.directive, ComponentDirective::Proceed);
    }

    #[test]
    fn role_whitelist_excludes_non_listed_workflow() {
        let engine = WorkflowEngine::new(vec![bugfix_workflow()]);
        let whitelist = vec!["other_workflow".to_string()];
        let outcome = engine.process("bugfix", Some(&whitelist), None, TurnResult::default(), 0);
        assert!(outcome.result.workflow_id.is_none());
    }
}
