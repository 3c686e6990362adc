#![deny(missing_docs)]
//! Cognitive Scaffolding Core — wires the eight components (Belief
//! State Tracker, Organization Kernel, Graph Workflow Engine, Tool
//! Fallback & Meta-Reasoning Gate, Memory Enhancement, Ontology Store
//! & Entity Resolution, Maintenance Pass, Supervisor) into one
//! [`scaffold_core::turn::Turn`] implementation around a single model
//! call per turn.
//!
//! [`CognitiveCore`] is the entry point: construct one from a
//! [`PipelineConfig`], a [`ModelCaller`], a [`scaffold_tool::ToolRegistry`],
//! a `StateReader`, and the two backend seams this crate doesn't
//! implement itself ([`scaffold_memory::SimilarityIndex`] and
//! [`MaintenanceSource`]), then call [`scaffold_core::turn::Turn::execute`]
//! once per turn. Every component degrades to passthrough internally;
//! this crate's own [`PipelineError`] only ever covers the pipeline's
//! own responsibilities (session state, the model call) and never
//! escapes `execute` as a hard failure.

mod config;
mod core;
mod error;
mod model;
mod ontology_store;
mod session;

pub use config::{OrgConfig, PipelineConfig, ToolsGateConfig};
pub use core::{CognitiveCore, MaintenanceSource};
pub use error::PipelineError;
pub use model::{
    ModelCaller, ModelError, ModelMessage, ModelRequest, ModelResponse, Role, StopReason,
    TokenUsage, ToolSchema,
};
pub use ontology_store::OntologyStore;
pub use session::{FailureCounters, LastTurnOutcome, SessionState, SESSION_STATE_KEY};
