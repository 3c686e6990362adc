#![deny(missing_docs)]
//! # scaffold — umbrella crate
//!
//! Single import surface for the cognitive scaffolding stack. Re-exports
//! protocol and implementation crates behind feature flags, plus a
//! `prelude` for the happy path.
//!
//! This crate is wiring, not logic — each feature flag just turns on a
//! path dependency and re-exports it. The turn-pipeline that wires the
//! eight cognitive components (belief tracking, organization, workflow,
//! tool gate, memory, ontology, maintenance, supervisor) together lives
//! in `scaffold-pipeline`.

#[cfg(feature = "core")]
pub use scaffold_core;
#[cfg(feature = "hooks")]
pub use scaffold_hooks;
#[cfg(feature = "orch-local")]
pub use scaffold_orch;
#[cfg(feature = "state-fs")]
pub use scaffold_state_fs;
#[cfg(feature = "state-memory")]
pub use scaffold_state_memory;
#[cfg(feature = "core")]
pub use scaffold_tool;

#[cfg(feature = "bst")]
pub use scaffold_bst;
#[cfg(feature = "org")]
pub use scaffold_org;
#[cfg(feature = "workflow")]
pub use scaffold_workflow;
#[cfg(feature = "tools-gate")]
pub use scaffold_tools_gate;
#[cfg(feature = "memory")]
pub use scaffold_memory;
#[cfg(feature = "ontology")]
pub use scaffold_ontology;
#[cfg(feature = "maintenance")]
pub use scaffold_maintenance;
#[cfg(feature = "supervisor")]
pub use scaffold_supervisor;
#[cfg(feature = "pipeline")]
pub use scaffold_pipeline;

/// Happy-path imports for composing a scaffolded turn pipeline.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use scaffold_core::{
        AgentId, Content, ContentBlock, CoreContext, Effect, ExitReason, Hook, HookAction,
        HookContext, HookPoint, Scope, SessionId, StateReader, StateStore, Turn, TurnConfig,
        TurnInput, TurnOutput, WorkflowId,
    };

    #[cfg(feature = "hooks")]
    pub use scaffold_hooks::HookRegistry;

    #[cfg(feature = "orch-local")]
    pub use scaffold_orch::LocalOrch;

    #[cfg(feature = "core")]
    pub use scaffold_tool::{ToolDyn, ToolError, ToolRegistry};

    #[cfg(feature = "state-memory")]
    pub use scaffold_state_memory::MemoryStore;

    #[cfg(feature = "state-fs")]
    pub use scaffold_state_fs::FsStore;

    #[cfg(feature = "pipeline")]
    pub use scaffold_pipeline::{CognitiveCore, MaintenanceSource, ModelCaller, PipelineConfig};
}
