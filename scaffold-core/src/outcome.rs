//! A common shape for what a cognitive component hands back to the pipeline.
//!
//! Belief tracking, the workflow engine, the tool gate, memory retrieval,
//! entity resolution, maintenance, and the supervisor all do very
//! different work, but the pipeline needs to treat their results
//! uniformly: did it want the turn to proceed, pause, or escalate, and
//! what should be logged about it. [`ComponentOutcome`] is that shape;
//! each crate wraps its own result type in it at the pipeline boundary.

use serde::{Deserialize, Serialize};

/// What a component pass concluded the pipeline should do next.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentDirective {
    /// Nothing unusual — continue to the next stage.
    Proceed,
    /// Surface a clarifying question to the user before continuing.
    NeedsClarification,
    /// Escalate per the PACE doctrine (see scaffold-org).
    Escalate,
    /// Halt the turn; something downstream should not run.
    Halt,
}

/// Wraps a component's domain result with the directive and any
/// human-readable notes the supervisor or hooks should see.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentOutcome<T> {
    /// The component's own result payload.
    pub result: T,
    /// What the pipeline should do next.
    pub directive: ComponentDirective,
    /// Notes for logs/hooks, not shown to the end user.
    #[serde(default)]
    pub notes: Vec<String>,
}

impl<T> ComponentOutcome<T> {
    /// Wrap a result with `Proceed` and no notes.
    pub fn proceed(result: T) -> Self {
        Self {
            result,
            directive: ComponentDirective::Proceed,
            notes: vec![],
        }
    }

    /// Wrap a result with an explicit directive.
    pub fn with_directive(result: T, directive: ComponentDirective) -> Self {
        Self {
            result,
            directive,
            notes: vec![],
        }
    }

    /// Attach a note.
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
