//! # scaffold-core — protocol traits and shared data model for the cognitive
//! scaffolding stack
//!
//! This crate defines the protocol boundaries that compose to form the
//! turn-pipeline wrapped around an unreliable local language model, plus
//! the shared data model (belief state, roles, SALUTE, workflow graphs,
//! memory fragments, relationships) that every component in the stack
//! reads and writes.
//!
//! ## The Protocols
//!
//! | Protocol | Trait | What it does |
//! |----------|-------|-------------|
//! | ① Turn | [`Turn`] | What one agent does per cycle |
//! | ② Orchestration | [`Orchestrator`] | How agents compose + durability |
//! | ③ State | [`StateStore`] | How data persists across turns |
//!
//! ## The Interfaces
//!
//! | Interface | Types | What it does |
//! |-----------|-------|-------------|
//! | ④ Hooks | [`Hook`], [`HookPoint`], [`HookAction`] | Observation + intervention |
//! | ⑤ Lifecycle | [`BudgetEvent`], [`CompactionEvent`] | Cross-layer coordination |
//!
//! ## Design Principle
//!
//! Every protocol trait is operation-defined, not mechanism-defined.
//! [`Turn::execute`] means "cause this agent to process one cycle" —
//! not "make an API call" or "run a subprocess." This is what makes
//! implementations swappable: a durable workflow engine, a function call,
//! and a future system that doesn't exist yet all implement the same trait.
//!
//! ## Dependency Notes
//!
//! This crate depends on `serde_json::Value` for extension data fields
//! (metadata, tool inputs, custom payloads). This is an intentional choice:
//! JSON is the universal interchange format for agentic systems, and
//! `serde_json::Value` is the de facto standard in the Rust ecosystem.
//!
//! ## Process-wide state, made explicit
//!
//! The active organization and the belief state are effectively
//! process-wide in the source system this crate formalizes. They are
//! carried here in an explicit [`CoreContext`], not hidden singletons.

#![deny(missing_docs)]

pub mod content;
pub mod duration;
pub mod effect;
pub mod error;
pub mod hook;
pub mod id;
pub mod lifecycle;
pub mod model;
pub mod orchestrator;
pub mod outcome;
pub mod state;
pub mod turn;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use content::{Content, ContentBlock};
pub use duration::DurationMs;
pub use effect::{Effect, Scope, SignalPayload};
pub use error::{HookError, OrchError, StateError, TurnError};
pub use hook::{Hook, HookAction, HookContext, HookPoint};
pub use id::{AgentId, ScopeId, SessionId, WorkflowId};
pub use lifecycle::{BudgetEvent, CompactionEvent, ObservableEvent};
pub use model::CoreContext;
pub use orchestrator::{Orchestrator, QueryPayload};
pub use outcome::ComponentOutcome;
pub use state::{SearchResult, StateReader, StateStore};
pub use turn::{ExitReason, ToolCallRecord, Turn, TurnConfig, TurnInput, TurnMetadata, TurnOutput};
