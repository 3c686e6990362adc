//! End-to-end turn tests: build a [`CognitiveCore`] over a hand-rolled
//! model double and a real [`scaffold_state_memory::MemoryStore`], and
//! drive [`Turn::execute`] the way an orchestrator would.

use scaffold_core::turn::TriggerType;
use scaffold_core::{Content, ContentBlock, Scope, SessionId, Turn, TurnInput, TurnConfig};
use scaffold_maintenance::MaintenanceRecord;
use scaffold_memory::{MemoryRecord, SimilarityIndex};
use scaffold_pipeline::{CognitiveCore, MaintenanceSource, ModelCaller, PipelineConfig};
use scaffold_state_memory::MemoryStore;
use scaffold_tool::{ToolDyn, ToolError, ToolRegistry};
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// A model double that returns one fixed response per call, recording
/// every request it was handed for assertions.
struct ScriptedModel {
    responses: Mutex<Vec<scaffold_pipeline::ModelResponse>>,
    requests: Mutex<Vec<scaffold_pipeline::ModelRequest>>,
}

impl ScriptedModel {
    fn new(responses: Vec<scaffold_pipeline::ModelResponse>) -> Self {
        ScriptedModel {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ModelCaller for ScriptedModel {
    fn call(
        &self,
        request: scaffold_pipeline::ModelRequest,
    ) -> impl Future<Output = Result<scaffold_pipeline::ModelResponse, scaffold_pipeline::ModelError>> + Send
    {
        self.requests.lock().expect("requests mutex poisoned").push(request);
        let response = self
            .responses
            .lock()
            .expect("responses mutex poisoned")
            .pop()
            .expect("scripted model ran out of responses");
        async move { Ok(response) }
    }
}

fn text_response(text: &str) -> scaffold_pipeline::ModelResponse {
    scaffold_pipeline::ModelResponse {
        content: Content::text(text),
        stop_reason: scaffold_pipeline::StopReason::EndTurn,
        usage: scaffold_pipeline::TokenUsage {
            input_tokens: 40,
            output_tokens: 12,
            cache_read_tokens: None,
            cache_creation_tokens: None,
        },
        model: "test-model".into(),
        cost: None,
    }
}

fn tool_call_response(tool_name: &str, args: Value) -> scaffold_pipeline::ModelResponse {
    scaffold_pipeline::ModelResponse {
        content: Content::Blocks(vec![ContentBlock::ToolUse {
            id: "call-1".into(),
            name: tool_name.into(),
            input: args,
        }]),
        stop_reason: scaffold_pipeline::StopReason::ToolUse,
        usage: scaffold_pipeline::TokenUsage {
            input_tokens: 50,
            output_tokens: 20,
            cache_read_tokens: None,
            cache_creation_tokens: None,
        },
        model: "test-model".into(),
        cost: None,
    }
}

/// No records eligible for maintenance; exercised separately by
/// `maintenance_cycle_runs_on_schedule` below.
struct EmptyMaintenanceSource;

impl MaintenanceSource for EmptyMaintenanceSource {
    fn records(&self) -> Vec<MaintenanceRecord> {
        Vec::new()
    }
}

struct StaticMaintenanceSource(Vec<MaintenanceRecord>);

impl MaintenanceSource for StaticMaintenanceSource {
    fn records(&self) -> Vec<MaintenanceRecord> {
        self.0.clone()
    }
}

/// A similarity index with no memories to surface.
struct EmptyIndex;

impl SimilarityIndex for EmptyIndex {
    fn query(&self, _query_text: &str, _k: usize) -> Vec<(String, f64)> {
        Vec::new()
    }

    fn get(&self, _id: &str) -> Option<MemoryRecord> {
        None
    }
}

struct EchoTool;

impl ToolDyn for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes its input back."
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"text": {"type": "string"}}})
    }

    fn call(&self, input: Value) -> Pin<Box<dyn Future<Output = Result<Value, ToolError>> + Send + '_>> {
        Box::pin(async move { Ok(json!({"echoed": input})) })
    }
}

fn build_core(
    model: ScriptedModel,
    maintenance_source: Box<dyn MaintenanceSource>,
) -> CognitiveCore<ScriptedModel> {
    build_core_with_state(model, maintenance_source, Arc::new(MemoryStore::new()))
}

fn build_core_with_state(
    model: ScriptedModel,
    maintenance_source: Box<dyn MaintenanceSource>,
    state: Arc<MemoryStore>,
) -> CognitiveCore<ScriptedModel> {
    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool));

    CognitiveCore::new(
        PipelineConfig::default(),
        model,
        tools,
        state,
        Box::new(EmptyIndex),
        maintenance_source,
    )
}

fn user_message(text: &str, session: &str) -> TurnInput {
    let mut input = TurnInput::new(Content::text(text), TriggerType::User);
    input.session = Some(SessionId::new(session));
    input
}

#[tokio::test]
async fn plain_message_produces_a_complete_turn_with_no_active_org() {
    let model = ScriptedModel::new(vec![text_response("Sure, here's the answer.")]);
    let core = build_core(model, Box::new(EmptyMaintenanceSource));

    let output = core
        .execute(user_message("what's the weather like", "s1"))
        .await
        .expect("execute never returns Err, only a degraded TurnOutput");

    assert_eq!(output.exit_reason, scaffold_core::ExitReason::Complete);
    assert_eq!(output.message.as_text(), Some("Sure, here's the answer."));
    assert_eq!(output.metadata.tokens_in, 40);
    assert_eq!(output.metadata.tokens_out, 12);
    assert!(!output.effects.is_empty(), "the session state write must always be present");
}

#[tokio::test]
async fn registered_tool_call_round_trips_through_the_gate() {
    let model = ScriptedModel::new(vec![
        text_response("Done, I echoed it."),
        tool_call_response("echo", json!({"text": "hello"})),
    ]);
    let core = build_core(model, Box::new(EmptyMaintenanceSource));

    let output = core
        .execute(user_message("please echo hello", "s2"))
        .await
        .unwrap();

    assert_eq!(output.metadata.tools_called.len(), 1);
    assert_eq!(output.metadata.tools_called[0].name, "echo");
    assert!(output.metadata.tools_called[0].success);
    let Content::Blocks(blocks) = &output.message else {
        panic!("expected a tool result block alongside the (empty) text block");
    };
    assert!(blocks.iter().any(|b| matches!(b, ContentBlock::ToolResult { is_error: false, .. })));
}

#[tokio::test]
async fn write_memory_effect_tool_is_intercepted_before_the_registry() {
    let model = ScriptedModel::new(vec![
        text_response("Noted."),
        tool_call_response(
            "write_memory",
            json!({"scope": "global", "key": "favorite_color", "value": "teal"}),
        ),
    ]);
    let core = build_core(model, Box::new(EmptyMaintenanceSource));

    let output = core.execute(user_message("remember my favorite color", "s3")).await.unwrap();

    let has_write = output.effects.iter().any(|effect| {
        matches!(
            effect,
            scaffold_core::Effect::WriteMemory { key, .. } if key == "favorite_color"
        )
    });
    assert!(has_write, "write_memory tool call should surface as an Effect::WriteMemory");
    // write_memory never touches the tool registry, so no ToolCallRecord for it.
    assert!(output.metadata.tools_called.iter().all(|t| t.name != "write_memory"));
}

#[tokio::test]
async fn model_stopping_at_max_tokens_degrades_to_an_apologetic_error_turn() {
    let mut response = text_response("cut off mid-sent");
    response.stop_reason = scaffold_pipeline::StopReason::MaxTokens;
    let model = ScriptedModel::new(vec![response]);
    let core = build_core(model, Box::new(EmptyMaintenanceSource));

    let output = core.execute(user_message("write me a novel", "s4")).await.unwrap();

    assert_eq!(output.exit_reason, scaffold_core::ExitReason::Error);
    assert!(output.effects.iter().any(|e| matches!(e, scaffold_core::Effect::Log { .. })));
}

#[tokio::test]
async fn session_state_persists_turn_index_across_calls() {
    use scaffold_core::StateReader;
    use scaffold_pipeline::SessionState;

    let store = Arc::new(MemoryStore::new());
    let model = ScriptedModel::new(vec![text_response("second"), text_response("first")]);
    let core = build_core_with_state(model, Box::new(EmptyMaintenanceSource), store.clone());

    core.execute(user_message("first message", "s5")).await.unwrap();
    core.execute(user_message("second message", "s5")).await.unwrap();

    let scope = Scope::Session(SessionId::new("s5"));
    let raw = store
        .read(&scope, scaffold_pipeline::SESSION_STATE_KEY)
        .await
        .unwrap()
        .expect("session state should have been written by both turns");
    let session: SessionState = serde_json::from_value(raw).unwrap();
    assert_eq!(session.turn_index, 2);
}

#[tokio::test]
async fn per_turn_allowed_tools_still_admits_effect_tools() {
    let model = ScriptedModel::new(vec![
        text_response("Signaled."),
        tool_call_response("signal", json!({"target": "wf-1", "signal_type": "resume"})),
    ]);
    let core = build_core(model, Box::new(EmptyMaintenanceSource));

    let mut input = user_message("resume the workflow", "s6");
    let mut config = TurnConfig::default();
    config.allowed_tools = Some(vec!["echo".to_string()]);
    input.config = Some(config);

    let output = core.execute(input).await.unwrap();
    let has_signal = output
        .effects
        .iter()
        .any(|e| matches!(e, scaffold_core::Effect::Signal { .. }));
    assert!(has_signal, "reserved effect tools bypass allowed_tools filtering");
}

#[tokio::test]
async fn maintenance_source_records_feed_a_scheduled_cycle() {
    use chrono::Utc;
    use scaffold_maintenance::{Relevance, ValidityTier};

    let record = MaintenanceRecord {
        id: "mem-1".into(),
        content: "the sky is blue".into(),
        tags: vec!["weather".into()],
        validity: ValidityTier::UserAsserted,
        load_bearing: false,
        relevance: Relevance::Active,
        access_count: 0,
        created_at: Utc::now(),
        created_cycle: 0,
        last_accessed: None,
        related_memory_ids: Vec::new(),
        superseded_by: None,
    };

    let mut config = PipelineConfig::default();
    config.maintenance.maintenance_interval_loops = 1;
    let model = ScriptedModel::new(vec![text_response("ok")]);

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(EchoTool));
    let core = CognitiveCore::new(
        config,
        model,
        tools,
        Arc::new(MemoryStore::new()),
        Box::new(EmptyIndex),
        Box::new(StaticMaintenanceSource(vec![record])),
    );

    let output = core.execute(user_message("hello", "s7")).await.unwrap();
    assert_eq!(output.exit_reason, scaffold_core::ExitReason::Complete);
}
