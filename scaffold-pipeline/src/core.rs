//! [`CognitiveCore`]: the `Turn` implementation that wires the eight
//! cognitive scaffolding components around one model call per turn.
//!
//! A single `execute` loop that assembles context, calls the model
//! once, intercepts a handful of reserved "effect tool" names before
//! they ever reach the tool registry, and turns everything else into
//! `scaffold_core::effect::Effect`s instead of touching state directly.
//! None of the eight components loop the model mid-turn themselves —
//! each turn is exactly one call.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::model::{ModelCaller, ModelMessage, ModelRequest, Role as ModelRole, StopReason, ToolSchema};
use crate::ontology_store::{OntologyStore, SharedOntologyStore};
use crate::session::{LastTurnOutcome, SessionState, SESSION_STATE_KEY};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scaffold_bst::{BeliefTracker, BstOutput};
use scaffold_core::effect::LogLevel;
use scaffold_core::{
    AgentId, Content, ContentBlock, Effect, Scope, SessionId, SignalPayload, StateReader, Turn,
    TurnConfig, TurnError, TurnInput, TurnMetadata, TurnOutput, WorkflowId,
};
use scaffold_core::turn::{ExitReason, ToolCallRecord, TriggerType};
use scaffold_core::duration::DurationMs;
use scaffold_maintenance::{DedupOutcome, MaintenancePass, MaintenanceRecord};
use scaffold_memory::{MemoryRetriever, SimilarityIndex};
use scaffold_ontology::{EntityCandidate, Provenance, RelationshipHint, ResolutionEngine};
use scaffold_org::{select_role, OrgKernel, PaceLevel, Role as OrgRole, WorkflowStatus};
use scaffold_supervisor::Supervisor;
use scaffold_tool::ToolRegistry;
use scaffold_tools_gate::ToolGate;
use scaffold_workflow::{TurnResult as WorkflowTurnResult, WorkflowEngine};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// How many of the most recent raw messages `BstOutcome` gets as
/// continuation-pattern context.
const RECENT_HISTORY_MAX_LEN: usize = 10;

/// Reserved tool names the core intercepts before they reach the tool
/// registry. `ingest_entity` is this crate's own addition — there's no
/// registry tool backing it either, it feeds the Ontology Store's
/// resolution engine directly.
const EFFECT_TOOL_NAMES: &[&str] = &["write_memory", "delete_memory", "signal", "delegate", "handoff", "ingest_entity"];

/// Enumerates memory fragments eligible for a maintenance cycle.
///
/// The core owns no memory storage of its own — that's the caller's
/// embedding/storage backend, the same one behind `SimilarityIndex`.
/// This trait is the seam a caller plugs its backend into so
/// `MaintenancePass::run` has something to dedup, link, and cluster.
pub trait MaintenanceSource: Send + Sync {
    /// Snapshot of every record currently eligible for maintenance.
    fn records(&self) -> Vec<MaintenanceRecord>;
}

/// Wraps the eight components into one [`scaffold_core::turn::Turn`].
///
/// Generic over the model boundary only — every component underneath
/// is driven through its own concrete type or a trait object the
/// caller supplies at construction, so swapping `M` never touches the
/// component wiring.
pub struct CognitiveCore<M: ModelCaller> {
    config: PipelineConfig,
    model: M,
    tools: ToolRegistry,
    state: Arc<dyn StateReader>,
    similarity_index: Box<dyn SimilarityIndex>,
    maintenance_source: Box<dyn MaintenanceSource>,
    bst: BeliefTracker,
    org_kernel: OrgKernel,
    roles: Vec<OrgRole>,
    workflow_engine: WorkflowEngine,
    tool_gate: ToolGate,
    memory_retriever: MemoryRetriever,
    ontology_store: Arc<OntologyStore>,
    resolution_engine: ResolutionEngine,
    maintenance_pass: MaintenancePass,
    supervisor: Mutex<Supervisor>,
    pending_entity_candidates: Mutex<Vec<EntityCandidate>>,
    superseded_ids: Mutex<std::collections::BTreeSet<String>>,
}

impl<M: ModelCaller> CognitiveCore<M> {
    /// Assembles every component from `config`, taking ownership of the
    /// handful of pieces that aren't config-shaped: the model boundary,
    /// the tool registry, the state reader, and the two backend seams
    /// (`similarity_index`, `maintenance_source`) this crate doesn't
    /// implement itself.
    pub fn new(
        config: PipelineConfig,
        model: M,
        tools: ToolRegistry,
        state: Arc<dyn StateReader>,
        similarity_index: Box<dyn SimilarityIndex>,
        maintenance_source: Box<dyn MaintenanceSource>,
    ) -> Self {
        let ontology_store = Arc::new(OntologyStore::new());
        let memory_retriever = MemoryRetriever::new(
            config.memory.clone(),
            Some(Box::new(SharedOntologyStore(ontology_store.clone()))),
            Some(Box::new(SharedOntologyStore(ontology_store.clone()))),
        );
        let org_kernel = OrgKernel::new(config.org.active_org.clone(), config.org.roles.clone());
        let roles = config.org.roles.clone();
        let workflow_engine = WorkflowEngine::new(config.workflow_library.clone());
        let tool_gate = ToolGate::new(config.tools_gate.schemas.clone(), config.tools_gate.advice.clone());
        let resolution_engine = ResolutionEngine::new(config.ontology.clone());
        let maintenance_pass = MaintenancePass::new(config.maintenance.clone());
        let supervisor = Mutex::new(Supervisor::new(config.supervisor));
        let bst = BeliefTracker::new(config.bst.clone());

        CognitiveCore {
            config,
            model,
            tools,
            state,
            similarity_index,
            maintenance_source,
            bst,
            org_kernel,
            roles,
            workflow_engine,
            tool_gate,
            memory_retriever,
            ontology_store,
            resolution_engine,
            maintenance_pass,
            supervisor,
            pending_entity_candidates: Mutex::new(Vec::new()),
            superseded_ids: Mutex::new(std::collections::BTreeSet::new()),
        }
    }

    fn scope_for(&self, session: &Option<SessionId>) -> Scope {
        session.as_ref().cloned().map(Scope::Session).unwrap_or(Scope::Global)
    }

    async fn load_session(&self, scope: &Scope) -> SessionState {
        match self.state.read(scope, SESSION_STATE_KEY).await {
            Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "session state failed to deserialize, starting fresh");
                SessionState::default()
            }),
            Ok(None) => SessionState::default(),
            Err(err) => {
                tracing::warn!(error = %err, "session state read failed, starting fresh");
                SessionState::default()
            }
        }
    }

    /// The turn body. Returns `Err` only for the pipeline's own
    /// plumbing failures (state serialization, an unrecoverable model
    /// call); `execute` traps those into a degraded but successful
    /// `TurnOutput` rather than letting them become a hard failure.
    async fn run_turn(&self, input: TurnInput, started: Instant) -> Result<TurnOutput, PipelineError> {
        let now = Utc::now();
        let message_text = input.message.as_text().unwrap_or_default().to_string();
        let scope = self.scope_for(&input.session);
        let mut session = self.load_session(&scope).await;
        let mut effects: Vec<Effect> = Vec::new();

        session.belief_state = scaffold_bst::tick(session.belief_state.take());
        session.turn_index += 1;
        let turn_index = session.turn_index;

        // 1. Belief State Tracker
        let bst_outcome = self.bst.process(&message_text, &session.recent_history, session.belief_state.as_ref(), turn_index);
        session.push_history(message_text.clone(), RECENT_HISTORY_MAX_LEN);

        let (task_message, domain): (String, Option<String>) = match bst_outcome.result {
            BstOutput::Clarify { question, belief_state } => {
                session.belief_state = Some(belief_state);
                session.turns_since_maintenance += 1;
                effects.push(self.persist_effect(&scope, &session)?);
                let mut metadata = TurnMetadata::default();
                metadata.turns_used = 1;
                metadata.duration = DurationMs::from(started.elapsed());
                let mut output = TurnOutput::new(Content::text(question), ExitReason::Complete);
                output.metadata = metadata;
                output.effects = effects;
                return Ok(output);
            }
            BstOutput::Enriched { enriched, belief_state } => {
                let domain = belief_state.domain.clone();
                session.belief_state = Some(belief_state);
                (enriched.render(), Some(domain))
            }
            BstOutput::Passthrough { message } => (message, None),
        };
        let domain_str = domain.clone().unwrap_or_else(|| "conversational".to_string());

        // 2. Organization Kernel
        let predicted_role = select_role(&self.roles, &domain_str);
        if predicted_role.map(|r| &r.role_id) != session.active_role_id.as_ref() {
            session.workflow_state = None;
        }
        let runtime = predicted_role.and_then(|r| session.role_runtime.get(&r.role_id).cloned());
        let agent_state = session.failure_counters.to_agent_failure_state();
        let workflow_status = if session.workflow_state.is_none() { WorkflowStatus::Idle } else { WorkflowStatus::Active };
        let activity = scaffold_org::Activity {
            current_task: Some(task_message.clone()),
            domain: Some(domain_str.clone()),
            workflow: session.workflow_state.as_ref().map(|s| s.workflow_id.clone()),
            step: session.workflow_state.as_ref().map(|s| s.current_node.clone()),
            total_steps: session.workflow_state.as_ref().map(|s| s.total_steps),
            current_tool: None,
            iterations_on_step: 0,
        };
        let location = scaffold_org::Location::default();
        let environment = scaffold_org::Environment {
            model: self.config.default_model.clone(),
            context_fill_pct: session.failure_counters.context_fill_pct,
            context_tokens_used: (session.failure_counters.context_fill_pct * self.config.context_window_tokens as f64) as u64,
            context_tokens_max: self.config.context_window_tokens,
            tool_failures_consecutive: session.failure_counters.tool_failures_consecutive,
            tool_failures_total: session.failure_counters.tool_failures_total,
            memory_fragments_stored: 0,
        };
        let org_outcome = self.org_kernel.process(
            &domain_str,
            agent_state,
            runtime,
            workflow_status,
            session.last_progress,
            activity,
            location,
            environment,
            now,
        );
        if let Some(role) = &org_outcome.result.active_role {
            session.active_role_id = Some(role.role_id.clone());
            if let Some(rt) = &org_outcome.result.runtime_state {
                session.role_runtime.insert(role.role_id.clone(), rt.clone());
            }
        }
        if let Some(salute) = &org_outcome.result.salute {
            effects.push(Effect::WriteMemory {
                scope: Scope::Global,
                key: salute.latest_key(),
                value: serde_json::to_value(salute).map_err(|e| PipelineError::State(e.to_string()))?,
            });
            effects.push(Effect::WriteMemory {
                scope: Scope::Global,
                key: salute.archive_key(),
                value: serde_json::to_value(salute).map_err(|e| PipelineError::State(e.to_string()))?,
            });
        }
        let role_whitelist: Option<Vec<String>> = org_outcome.result.active_role.as_ref().and_then(|r| {
            if r.capabilities.workflows.is_empty() { None } else { Some(r.capabilities.workflows.clone()) }
        });

        // 3. Graph Workflow Engine
        let workflow_turn_result = WorkflowTurnResult {
            tool_succeeded: session.last_turn.tool_succeeded,
            output_text: &session.last_turn.output_text,
            last_tool_message: session.last_turn.last_tool_message.as_deref(),
            files_touched: &session.last_turn.files_touched,
        };
        let workflow_outcome = self.workflow_engine.process(
            &domain_str,
            role_whitelist.as_deref(),
            session.workflow_state.take(),
            workflow_turn_result,
            turn_index,
        );
        let progress_made = workflow_outcome.result.progress > session.last_progress;
        session.failure_counters.turns_since_progress = if progress_made { 0 } else { session.failure_counters.turns_since_progress + 1 };
        session.last_progress = workflow_outcome.result.progress;
        session.workflow_state = workflow_outcome.result.state.clone();

        // 5. Memory Enhancement (retrieval happens before the model call)
        let memory_outcome = self.memory_retriever.retrieve(self.similarity_index.as_ref(), &task_message, domain.as_deref(), now, turn_index);

        let steering = std::mem::take(&mut session.pending_steering);
        let system_prompt = self.build_system_prompt(&input, workflow_outcome.result.instruction.as_deref(), &memory_outcome.result, &steering);

        // Model call
        let mut tool_schemas: Vec<ToolSchema> = self
            .tools
            .iter()
            .map(|t| ToolSchema { name: t.name().to_string(), description: t.description().to_string(), input_schema: t.input_schema() })
            .collect();
        tool_schemas.extend(effect_tool_schemas());
        if let Some(allowed) = input.config.as_ref().and_then(|c| c.allowed_tools.as_ref()) {
            tool_schemas.retain(|s| allowed.contains(&s.name) || EFFECT_TOOL_NAMES.contains(&s.name.as_str()));
        }
        let model_override = input.config.as_ref().and_then(|c| c.model.clone()).or_else(|| self.config.default_model.clone());
        let request = ModelRequest {
            model: model_override,
            messages: vec![ModelMessage::new(ModelRole::User, Content::text(task_message))],
            tools: tool_schemas,
            max_tokens: Some(self.config.default_max_tokens),
            temperature: None,
            system: Some(system_prompt),
        };
        let response = self.model.call(request).await.map_err(|err| PipelineError::Model(err.to_string()))?;

        if matches!(response.stop_reason, StopReason::MaxTokens | StopReason::ContentFilter) {
            return Err(PipelineError::Model(format!("model stopped with {:?}", response.stop_reason)));
        }

        // 4. Tool Fallback & Meta-Reasoning Gate, plus effect-tool interception
        let mut tools_called = Vec::new();
        let mut tool_result_blocks = Vec::new();
        let mut any_tool_failed = false;
        let mut consecutive_failures = session.failure_counters.tool_failures_consecutive;

        if let Content::Blocks(blocks) = &response.content {
            for block in blocks {
                let ContentBlock::ToolUse { id, name, input: tool_input } = block else { continue };
                if name == "ingest_entity" {
                    let ok = self.handle_ingest_entity(tool_input, now, turn_index);
                    if !ok {
                        any_tool_failed = true;
                    }
                    tool_result_blocks.push(ContentBlock::ToolResult {
                        tool_use_id: id.clone(),
                        content: if ok { "entity ingested.".into() } else { "invalid arguments for ingest_entity.".into() },
                        is_error: !ok,
                    });
                    tools_called.push(ToolCallRecord::new(name.clone(), DurationMs::ZERO, ok));
                } else if EFFECT_TOOL_NAMES.contains(&name.as_str()) {
                    match try_as_effect(name, tool_input) {
                        Some(effect) => {
                            effects.push(effect);
                            tool_result_blocks.push(ContentBlock::ToolResult {
                                tool_use_id: id.clone(),
                                content: format!("{name} effect recorded."),
                                is_error: false,
                            });
                            tools_called.push(ToolCallRecord::new(name.clone(), DurationMs::ZERO, true));
                        }
                        None => {
                            any_tool_failed = true;
                            tool_result_blocks.push(ContentBlock::ToolResult {
                                tool_use_id: id.clone(),
                                content: format!("invalid arguments for {name}."),
                                is_error: true,
                            });
                            tools_called.push(ToolCallRecord::new(name.clone(), DurationMs::ZERO, false));
                        }
                    }
                } else {
                    let call_started = Instant::now();
                    let gated = self.tool_gate.execute(&self.tools, name, tool_input.clone(), turn_index).await;
                    let duration = DurationMs::from(call_started.elapsed());
                    let success = gated.post.as_ref().map(|p| p.error_kind.is_none()).unwrap_or(false);
                    if let Some(post) = &gated.post {
                        consecutive_failures = post.consecutive_failures;
                        if post.error_kind.is_some() {
                            session.failure_counters.tool_failures_total += 1;
                        }
                    }
                    if !success {
                        any_tool_failed = true;
                    }
                    let content_text = gated.response.as_ref().map(|v| v.to_string()).unwrap_or_else(|| "tool call did not return a result.".into());
                    tool_result_blocks.push(ContentBlock::ToolResult { tool_use_id: id.clone(), content: content_text, is_error: !success });
                    tools_called.push(ToolCallRecord::new(name.clone(), duration, success));
                }
            }
        }
        session.failure_counters.tool_failures_consecutive = consecutive_failures;
        session.failure_counters.context_fill_pct = ((response.usage.input_tokens + response.usage.output_tokens) as f64 / self.config.context_window_tokens as f64).min(1.0);

        let last_tool_message = tool_result_blocks.last().and_then(|b| match b {
            ContentBlock::ToolResult { content, .. } => Some(content.clone()),
            _ => None,
        });
        let output_text = response.content.as_text().unwrap_or_default().to_string();
        session.last_turn = LastTurnOutcome {
            tool_succeeded: !any_tool_failed,
            output_text: output_text.clone(),
            last_tool_message,
            files_touched: Vec::new(),
        };

        // Supervisor (post tool-call, pre maintenance)
        let role_pace_text = org_outcome
            .result
            .active_role
            .as_ref()
            .map(|role| pace_action_text(role, org_outcome.result.runtime_state.as_ref().map(|rt| rt.pace_level).unwrap_or(PaceLevel::Primary)))
            .unwrap_or("no active role; proceed as normal");
        let recent_failures = self.tool_gate.recent_failures();
        let agent_state_after = session.failure_counters.to_agent_failure_state();
        let pace_level = org_outcome.result.runtime_state.as_ref().map(|rt| rt.pace_level).unwrap_or(PaceLevel::Primary);
        let supervisor_outcome = {
            let mut supervisor = self.supervisor.lock().expect("supervisor mutex poisoned");
            supervisor.scan(turn_index, &agent_state_after, pace_level, &recent_failures, role_pace_text)
        };
        session.pending_steering = supervisor_outcome.result.steering;

        // 6. Maintenance Pass
        session.turns_since_maintenance += 1;
        if self.config.maintenance.enabled && session.turns_since_maintenance >= self.config.maintenance.maintenance_interval_loops {
            session.turns_since_maintenance = 0;
            self.run_maintenance(turn_index, now, &mut effects)?;
        }

        // Persist session
        effects.push(self.persist_effect(&scope, &session)?);

        let mut final_content_blocks: Vec<ContentBlock> = Vec::new();
        if !output_text.is_empty() {
            final_content_blocks.push(ContentBlock::Text { text: output_text });
        }
        final_content_blocks.extend(tool_result_blocks);
        let message = if final_content_blocks.is_empty() { Content::text(String::new()) } else { Content::Blocks(final_content_blocks) };

        let mut metadata = TurnMetadata::default();
        metadata.tokens_in = response.usage.input_tokens;
        metadata.tokens_out = response.usage.output_tokens;
        metadata.cost = response.cost.unwrap_or_default();
        metadata.turns_used = 1;
        metadata.tools_called = tools_called;
        metadata.duration = DurationMs::from(started.elapsed());

        let mut output = TurnOutput::new(message, ExitReason::Complete);
        output.metadata = metadata;
        output.effects = effects;
        Ok(output)
    }

    fn build_system_prompt(&self, input: &TurnInput, workflow_instruction: Option<&str>, memory: &scaffold_memory::RetrievalOutput, steering: &[scaffold_supervisor::SteeringMessage]) -> String {
        let mut sections = vec![self.config.system_prompt.clone()];
        if let Some(instruction) = workflow_instruction {
            sections.push(format!("Current workflow step: {instruction}"));
        }
        if !memory.emitted.is_empty() {
            let rendered = memory.emitted.iter().map(|c| format!("- {}", c.record.content)).collect::<Vec<_>>().join("\n");
            sections.push(format!("Relevant memory:\n{rendered}"));
        }
        if !memory.ontology_connections.is_empty() {
            sections.push(format!("Known entity connections:\n{}", memory.ontology_connections.join("\n")));
        }
        if !steering.is_empty() {
            let rendered = steering.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join("\n");
            sections.push(format!("Supervisor guidance:\n{rendered}"));
        }
        if let Some(addendum) = input.config.as_ref().and_then(|c: &TurnConfig| c.system_addendum.as_ref()) {
            sections.push(addendum.clone());
        }
        sections.join("\n\n")
    }

    fn persist_effect(&self, scope: &Scope, session: &SessionState) -> Result<Effect, PipelineError> {
        let value = serde_json::to_value(session).map_err(|e| PipelineError::State(e.to_string()))?;
        Ok(Effect::WriteMemory { scope: scope.clone(), key: SESSION_STATE_KEY.to_string(), value })
    }

    /// Parses an `ingest_entity` call's arguments, resolves it against
    /// whatever the Ontology Store already knows, and both merges the
    /// result in immediately and queues the raw candidate for the next
    /// maintenance cycle's own resolution pass.
    fn handle_ingest_entity(&self, tool_input: &Value, now: DateTime<Utc>, turn_index: u64) -> bool {
        let Some(candidate) = parse_entity_candidate(tool_input, now, format!("turn-{turn_index}")) else {
            return false;
        };
        let resolved = self.resolution_engine.resolve_batch(vec![candidate.clone()], now);
        self.ontology_store.ingest_entities(resolved.result.resolved.clone());
        let known = self.ontology_store.entities();
        let edges = scaffold_ontology::resolve_relationship_hints(&candidate.candidate_id, &candidate.relationship_hints, &known);
        self.ontology_store.ingest_relationships(edges);
        self.pending_entity_candidates.lock().expect("pending candidates mutex poisoned").push(candidate);
        true
    }

    fn run_maintenance(&self, turn_index: u64, now: DateTime<Utc>, effects: &mut Vec<Effect>) -> Result<(), PipelineError> {
        let records = self.maintenance_source.records();
        let pending: Vec<EntityCandidate> = std::mem::take(&mut *self.pending_entity_candidates.lock().expect("pending candidates mutex poisoned"));
        let relationship_edges = self.ontology_store.relationship_edges();
        let superseded_snapshot = self.superseded_ids.lock().expect("superseded ids mutex poisoned").clone();
        let co_retrieval_log = self.memory_retriever.co_retrieval_log();

        let maintenance_outcome = self.maintenance_pass.run(&records, self.similarity_index.as_ref(), &co_retrieval_log, turn_index, pending, relationship_edges, &superseded_snapshot, now);

        {
            let mut superseded = self.superseded_ids.lock().expect("superseded ids mutex poisoned");
            for decision in &maintenance_outcome.result.dedup_decisions {
                if let DedupOutcome::Resolved { loser, .. } = decision {
                    superseded.insert(loser.clone());
                }
            }
        }
        self.ontology_store.replace_relationship_edges(maintenance_outcome.result.relationship_edges.clone());

        if !maintenance_outcome.result.entity_summaries.is_empty() {
            effects.push(Effect::WriteMemory {
                scope: Scope::Global,
                key: "maintenance_entity_summaries".to_string(),
                value: serde_json::to_value(&maintenance_outcome.result.entity_summaries).map_err(|e| PipelineError::State(e.to_string()))?,
            });
        }
        if !maintenance_outcome.result.dedup_decisions.is_empty() {
            effects.push(Effect::Log {
                level: LogLevel::Info,
                message: format!("maintenance cycle resolved {} duplicate pair(s)", maintenance_outcome.result.dedup_decisions.len()),
                data: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<M: ModelCaller> Turn for CognitiveCore<M> {
    async fn execute(&self, input: TurnInput) -> Result<TurnOutput, TurnError> {
        let started = Instant::now();
        match self.run_turn(input, started).await {
            Ok(output) => Ok(output),
            Err(err) => {
                tracing::error!(error = %err, "turn failed, degrading to passthrough");
                let mut metadata = TurnMetadata::default();
                metadata.duration = DurationMs::from(started.elapsed());
                let mut output = TurnOutput::new(
                    Content::text("I ran into an internal error handling that turn. Please try again.".to_string()),
                    ExitReason::Error,
                );
                output.metadata = metadata;
                output.effects = vec![Effect::Log { level: LogLevel::Error, message: err.to_string(), data: None }];
                Ok(output)
            }
        }
    }
}

fn pace_action_text(role: &OrgRole, level: PaceLevel) -> &str {
    let tier = match level {
        PaceLevel::Primary => &role.pace_plan.primary,
        PaceLevel::Alternate => &role.pace_plan.alternate,
        PaceLevel::Contingent => &role.pace_plan.contingent,
        PaceLevel::Emergency => &role.pace_plan.emergency,
    };
    &tier.action
}

/// Schemas for the reserved tools intercepted before the registry,
/// plus this crate's own `ingest_entity` addition.
fn effect_tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "write_memory".into(),
            description: "Write a value into session, workflow, or global memory.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "scope": {"type": "string"},
                    "key": {"type": "string"},
                    "value": {}
                },
                "required": ["scope", "key", "value"]
            }),
        },
        ToolSchema {
            name: "delete_memory".into(),
            description: "Delete a value from session, workflow, or global memory.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "scope": {"type": "string"},
                    "key": {"type": "string"}
                },
                "required": ["scope", "key"]
            }),
        },
        ToolSchema {
            name: "signal".into(),
            description: "Send a signal to a running workflow.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target": {"type": "string"},
                    "signal_type": {"type": "string"},
                    "data": {}
                },
                "required": ["target"]
            }),
        },
        ToolSchema {
            name: "delegate".into(),
            description: "Delegate a task to another agent.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "agent": {"type": "string"},
                    "message": {"type": "string"}
                },
                "required": ["agent", "message"]
            }),
        },
        ToolSchema {
            name: "handoff".into(),
            description: "Hand the session off to another agent along with state.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "agent": {"type": "string"},
                    "state": {}
                },
                "required": ["agent"]
            }),
        },
        ToolSchema {
            name: "ingest_entity".into(),
            description: "Register an entity observed in this conversation for ontology resolution.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "candidate_id": {"type": "string"},
                    "entity_type": {"type": "string"},
                    "properties": {"type": "object"},
                    "relationship_hints": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "relationship": {"type": "string"},
                                "target_name_or_id": {"type": "string"},
                                "confidence": {"type": "number"}
                            },
                            "required": ["relationship", "target_name_or_id"]
                        }
                    },
                    "confidence": {"type": "number"}
                },
                "required": ["candidate_id", "entity_type", "properties"]
            }),
        },
    ]
}

fn parse_scope(raw: &str) -> Scope {
    if raw == "global" {
        return Scope::Global;
    }
    if let Some(id) = raw.strip_prefix("session:") {
        return Scope::Session(SessionId::new(id));
    }
    if let Some(id) = raw.strip_prefix("workflow:") {
        return Scope::Workflow(WorkflowId::new(id));
    }
    Scope::Custom(raw.to_string())
}

/// Translates a reserved tool call's JSON arguments into the matching
/// `scaffold_core::effect::Effect`, returning `None` on any missing or
/// malformed required field.
fn try_as_effect(name: &str, input: &Value) -> Option<Effect> {
    match name {
        "write_memory" => {
            let scope = parse_scope(input.get("scope")?.as_str()?);
            let key = input.get("key")?.as_str()?.to_string();
            let value = input.get("value")?.clone();
            Some(Effect::WriteMemory { scope, key, value })
        }
        "delete_memory" => {
            let scope = parse_scope(input.get("scope")?.as_str()?);
            let key = input.get("key")?.as_str()?.to_string();
            Some(Effect::DeleteMemory { scope, key })
        }
        "signal" => {
            let target = WorkflowId::new(input.get("target")?.as_str()?);
            let signal_type = input.get("signal_type").and_then(|v| v.as_str()).unwrap_or("default");
            let data = input.get("data").cloned().unwrap_or(Value::Null);
            Some(Effect::Signal { target, payload: SignalPayload::new(signal_type, data) })
        }
        "delegate" => {
            let agent = AgentId::new(input.get("agent")?.as_str()?);
            let message = input.get("message")?.as_str()?.to_string();
            let delegate_input = TurnInput::new(Content::text(message), TriggerType::Task);
            Some(Effect::Delegate { agent, input: Box::new(delegate_input) })
        }
        "handoff" => {
            let agent = AgentId::new(input.get("agent")?.as_str()?);
            let state = input.get("state").cloned().unwrap_or(Value::Null);
            Some(Effect::Handoff { agent, state })
        }
        _ => None,
    }
}

fn parse_entity_candidate(input: &Value, now: DateTime<Utc>, record_id: String) -> Option<EntityCandidate> {
    let candidate_id = input.get("candidate_id")?.as_str()?.to_string();
    let entity_type = input.get("entity_type")?.as_str()?.to_string();
    let properties: BTreeMap<String, Value> = input.get("properties")?.as_object()?.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    let relationship_hints = input
        .get("relationship_hints")
        .and_then(|v| v.as_array())
        .map(|hints| {
            hints
                .iter()
                .filter_map(|hint| {
                    Some(RelationshipHint {
                        relationship: hint.get("relationship")?.as_str()?.to_string(),
                        target_name_or_id: hint.get("target_name_or_id")?.as_str()?.to_string(),
                        confidence: hint.get("confidence").and_then(|c| c.as_f64()).unwrap_or(0.7),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    let confidence = input.get("confidence").and_then(|c| c.as_f64()).unwrap_or(0.8);
    Some(EntityCandidate {
        candidate_id,
        entity_type,
        properties,
        relationship_hints,
        provenance: Provenance { source_id: "model".into(), record_id, source_type: "conversation_turn".into(), ingested_at: now, confidence },
    })
}
