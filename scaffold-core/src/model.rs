//! Shared context threaded through the eight cognitive components.
//!
//! The component crates (belief tracking, organization, workflow,
//! tool gate, memory, ontology, maintenance, supervisor) each define
//! their own domain types. What they share is *where they run*: the
//! same session, the same scope, the same turn. [`CoreContext`] makes
//! that explicit instead of leaving it as ambient global state.

use crate::effect::Scope;
use crate::id::{AgentId, SessionId};
use serde::{Deserialize, Serialize};

/// Identity and scoping shared by every component pass within one turn.
///
/// A component never reaches for a singleton or a thread-local to find
/// out "whose turn is this" — it's handed a `CoreContext`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreContext {
    /// Conversation this turn belongs to.
    pub session: SessionId,
    /// Agent executing the turn.
    pub agent: AgentId,
    /// Storage scope components should read/write under.
    pub scope: Scope,
    /// Monotonic turn counter within the session, used for decay
    /// scoring and dormancy detection. Starts at zero.
    pub turn_index: u64,
}

impl CoreContext {
    /// Start a new context at turn zero.
    pub fn new(session: SessionId, agent: AgentId, scope: Scope) -> Self {
        Self {
            session,
            agent,
            scope,
            turn_index: 0,
        }
    }

    /// Return a context advanced to the next turn, same identity and scope.
    pub fn advance(&self) -> Self {
        Self {
            turn_index: self.turn_index + 1,
            ..self.clone()
        }
    }
}
