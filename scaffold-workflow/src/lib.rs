#![deny(missing_docs)]
//! Graph Workflow Engine — directed-graph traversal over named task
//! graphs, with verification predicates gating each edge and a bounded
//! retry/escalation policy per node.
//!
//! A workflow is chosen once (by domain + role whitelist) and then
//! traversed turn by turn; on continuation the engine resumes the
//! existing [`WorkflowState`] rather than reselecting.

mod graph;
mod state;
mod traversal;

pub use graph::{EdgeCondition, EdgeKind, Node, NodeKind, VerificationPredicate, Workflow};
pub use state::{TraversalEvent, WorkflowState};
pub use traversal::{select_workflow, TurnResult, WorkflowEngine, WorkflowOutput};

use scaffold_core::outcome::ComponentOutcome;
use thiserror::Error;

/// Errors internal to workflow traversal. None of these escape
/// [`WorkflowEngine::process`] — any internal problem degrades to a
/// passthrough (no active workflow) outcome.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Referenced a node id that doesn't exist in the graph.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// The named workflow isn't registered.
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),

    /// A graph has no `start` node or more than one.
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// A state store read/write failed.
    #[error("state error: {0}")]
    State(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// What the Graph Workflow Engine reports to the pipeline for a turn.
pub type WorkflowOutcome = ComponentOutcome<WorkflowOutput>;
