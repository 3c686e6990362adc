//! Static configuration for [`crate::core::CognitiveCore`]: the bundle
//! of per-component configs plus the model-call defaults, all loaded
//! once and held for the process lifetime.

use scaffold_bst::SlotTaxonomy;
use scaffold_maintenance::MaintenanceConfig;
use scaffold_memory::MemoryConfig;
use scaffold_ontology::ResolutionConfig;
use scaffold_org::{Organization, Role};
use scaffold_supervisor::SupervisorConfig;
use scaffold_tools_gate::AdviceTable;
use scaffold_workflow::Workflow;
use std::collections::BTreeMap;

/// Static configuration for a [`crate::core::CognitiveCore`] instance.
///
/// Per-request overrides (model, max tokens, allowed tools, a system
/// addendum) come from `TurnInput.config`; this struct holds the
/// defaults and the eight components' own tunables. Unlike the
/// per-component configs it bundles, this struct is assembled in code
/// rather than deserialized whole — [`AdviceTable`] has no `serde`
/// impl, so the top-level bundle stays code-constructed even though
/// every component config underneath it is serde-backed.
#[derive(Debug)]
pub struct PipelineConfig {
    /// Base system prompt, prepended to any per-turn addendum.
    pub system_prompt: String,
    /// Default model identifier, used when `TurnConfig.model` is unset.
    pub default_model: Option<String>,
    /// Default maximum output tokens per model call.
    pub default_max_tokens: u32,
    /// Context window size in tokens, used to compute
    /// `FailureCounters::context_fill_pct` for the PACE
    /// `ContextFillAbove` trigger and the SALUTE environment block.
    pub context_window_tokens: u64,
    /// Belief State Tracker's slot taxonomy.
    pub bst: SlotTaxonomy,
    /// Organization Kernel's active organization and role roster.
    pub org: OrgConfig,
    /// Graph Workflow Engine's library of selectable workflows.
    pub workflow_library: Vec<Workflow>,
    /// Tool Fallback & Meta-Reasoning Gate's static schemas and advice.
    pub tools_gate: ToolsGateConfig,
    /// Memory Enhancement's retrieval tunables.
    pub memory: MemoryConfig,
    /// Ontology Store's real-time entity resolution tunables, used by
    /// the pipeline's own resolution engine (separate from the copy
    /// `maintenance` drives over its own candidate queue).
    pub ontology: ResolutionConfig,
    /// Maintenance Pass's tunables, including its own nested
    /// resolution config used only for entity-summary bookkeeping.
    pub maintenance: MaintenanceConfig,
    /// Supervisor's anomaly thresholds and cooldown window.
    pub supervisor: SupervisorConfig,
}

/// The Organization Kernel's static inputs.
#[derive(Debug, Clone, Default)]
pub struct OrgConfig {
    /// The sentinel organization, `None` means the kernel is inert and
    /// every turn proceeds unfiltered.
    pub active_org: Option<Organization>,
    /// All role profiles the active organization can route to.
    pub roles: Vec<Role>,
}

/// The Tool Gate's static inputs.
#[derive(Debug, Default)]
pub struct ToolsGateConfig {
    /// Per-tool argument schemas.
    pub schemas: BTreeMap<String, scaffold_tools_gate::ArgSchema>,
    /// Per-tool/per-kind fallback advice.
    pub advice: AdviceTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            system_prompt: "You are a helpful assistant.".into(),
            default_model: None,
            default_max_tokens: 4096,
            context_window_tokens: 128_000,
            bst: SlotTaxonomy::default(),
            org: OrgConfig::default(),
            workflow_library: Vec::new(),
            tools_gate: ToolsGateConfig::default(),
            memory: MemoryConfig::default(),
            ontology: ResolutionConfig::default(),
            maintenance: MaintenanceConfig::default(),
            supervisor: SupervisorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_fully_enabled() {
        let config = PipelineConfig::default();
        assert!(config.bst.enabled);
        assert!(config.memory.enabled);
        assert!(config.maintenance.enabled);
        assert!(config.supervisor.enabled);
        assert!(config.org.active_org.is_none());
    }

    #[test]
    fn default_config_has_no_workflows_or_roles() {
        let config = PipelineConfig::default();
        assert!(config.workflow_library.is_empty());
        assert!(config.org.roles.is_empty());
    }
}
