//! Wires schema validation, the failure tracker, and the advisor
//! table into the two hook points surrounding a tool call.

use crate::advisor::AdviceTable;
use crate::classify::{classify_failure, ErrorKind};
use crate::schema::{ArgSchema, ValidationResult};
use crate::tracker::{FailureRecord, FailureTracker};
use scaffold_core::outcome::ComponentOutcome;
use scaffold_tool::ToolRegistry;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// The outcome of running a tool call through both hook points.
#[derive(Debug, Clone)]
pub struct GatedCallOutput {
    /// The pre-call result (possibly skipped, with advice attached).
    pub pre: PreCallOutput,
    /// The raw tool response, `None` if the call was skipped or the
    /// tool wasn't registered.
    pub response: Option<Value>,
    /// The post-call classification, `None` if the call never ran.
    pub post: Option<PostCallOutput>,
}

/// Per-tool consecutive-failure threshold past which fallback advice
/// is injected.
pub const TOOL_THRESHOLD: u32 = 2;
/// Ring-wide failure count past which "step back and reassess" advice
/// is injected regardless of which tool is next.
pub const GLOBAL_THRESHOLD: usize = 5;

/// Result of the pre-call gate.
#[derive(Debug, Clone)]
pub struct PreCallOutput {
    /// Normalized arguments (aliases resolved, defaults injected), or
    /// the original arguments unchanged if validation couldn't run.
    pub args: Value,
    /// Set when arguments couldn't be repaired; the call should be
    /// skipped and scored as a `syntax` failure without ever reaching
    /// the tool.
    pub skip: bool,
    /// Advisory strings to surface to the model before it retries.
    pub advice: Vec<String>,
}

/// Result of the post-call logger.
#[derive(Debug, Clone)]
pub struct PostCallOutput {
    /// The classified failure kind, `None` on success.
    pub error_kind: Option<ErrorKind>,
    /// Consecutive failures for this tool after recording this call.
    pub consecutive_failures: u32,
}

/// The stateful gate: owns the failure tracker across calls within a
/// session and consults static schemas + an advice table.
pub struct ToolGate {
    schemas: BTreeMap<String, ArgSchema>,
    advice: AdviceTable,
    tracker: Mutex<FailureTracker>,
}

impl ToolGate {
    /// Builds a gate from a static schema map and advice table.
    pub fn new(schemas: BTreeMap<String, ArgSchema>, advice: AdviceTable) -> Self {
        ToolGate {
            schemas,
            advice,
            tracker: Mutex::new(FailureTracker::new()),
        }
    }

    /// Runs before a tool call: normalizes arguments and attaches any
    /// advice the failure history warrants. Never fails outward — a
    /// missing schema just means no normalization happens.
    pub fn pre_call(&self, tool_name: &str, mut args: Value) -> ComponentOutcome<PreCallOutput> {
        let mut skip = false;
        if let Some(schema) = self.schemas.get(tool_name) {
            if let ValidationResult::Unfixable { missing } = schema.normalize(&mut args) {
                tracing::warn!(tool_name, ?missing, "unfixable tool arguments, skipping call");
                skip = true;
            }
        }

        let tracker = self.tracker.lock().expect("tool gate tracker poisoned");
        let mut advice = Vec::new();
        if !skip && tracker.consecutive_failures(tool_name) >= TOOL_THRESHOLD {
            if let Some(last_kind) = tracker
                .ring()
                .filter(|r| r.tool_name == tool_name)
                .next_back()
                .map(|r| r.error_kind)
            {
                if let Some(text) = self.advice.lookup(tool_name, last_kind) {
                    advice.push(text.to_string());
                }
            }
        }
        if tracker.ring_len() >= GLOBAL_THRESHOLD {
            advice.push("Step back and reassess the overall approach before continuing.".to_string());
        }

        ComponentOutcome::proceed(PreCallOutput { args, skip, advice })
    }

    /// Runs after a tool call completes: classifies the response text
    /// and updates the failure tracker. Never fails outward — tool
    /// execution has already happened by this point regardless.
    pub fn post_call(
        &self,
        tool_name: &str,
        response_text: &str,
        turn_index: u64,
    ) -> ComponentOutcome<PostCallOutput> {
        let error_kind = classify_failure(response_text);
        let mut tracker = self.tracker.lock().expect("tool gate tracker poisoned");
        match error_kind {
            Some(kind) => tracker.record_failure(tool_name, kind, turn_index),
            None => tracker.record_success(tool_name),
        }
        let consecutive_failures = tracker.consecutive_failures(tool_name);
        ComponentOutcome::proceed(PostCallOutput {
            error_kind,
            consecutive_failures,
        })
    }

    /// Snapshot of the failure ring across all tools, oldest first.
    /// Read by the supervisor's loop/cascade anomaly checks, which
    /// need cross-tool history the per-tool counters don't expose.
    pub fn recent_failures(&self) -> Vec<FailureRecord> {
        self.tracker.lock().expect("tool gate tracker poisoned").ring().cloned().collect()
    }

    /// Runs a full tool invocation through both hook points: validate
    /// and advise, look the tool up in `registry` and call it unless
    /// skipped, then classify the response and update the tracker.
    /// Tool-side execution errors are rendered as response text so
    /// the post-call classifier can still act on them.
    pub async fn execute(
        &self,
        registry: &ToolRegistry,
        tool_name: &str,
        args: Value,
        turn_index: u64,
    ) -> GatedCallOutput {
        let pre = self.pre_call(tool_name, args).result;
        if pre.skip {
            let post = self.post_call(tool_name, "invalid argument: call skipped", turn_index).result;
            return GatedCallOutput {
                pre,
                response: None,
                post: Some(post),
            };
        }

        let Some(tool) = registry.get(tool_name) else {
            return GatedCallOutput {
                pre,
                response: None,
                post: None,
            };
        };

        let response_text;
        let response = match tool.call(pre.args.clone()).await {
            Ok(value) => {
                response_text = value.to_string();
                Some(value)
            }
            Err(err) => {
                response_text = err.to_string();
                None
            }
        };
        let post = self.post_call(tool_name, &response_text, turn_index).result;
        GatedCallOutput {
            pre,
            response,
            post: Some(post),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gate_with_bash_schema() -> ToolGate {
        let mut schemas = BTreeMap::new();
        schemas.insert(
            "bash".to_string(),
            ArgSchema {
                required: vec!["command".into()],
                aliases: BTreeMap::new(),
                defaults: BTreeMap::new(),
            },
        );
        let mut advice = AdviceTable::new();
        advice.set("bash", ErrorKind::Timeout, "retry with a shorter command");
        ToolGate::new(schemas, advice)
    }

    #[test]
    fn unfixable_args_are_skipped() {
        let gate = gate_with_bash_schema();
        let outcome = gate.pre_call("bash", json!({}));
        assert!(outcome.result.skip);
    }

    #[test]
    fn valid_args_pass_through() {
        let gate = gate_with_bash_schema();
        let outcome = gate.pre_call("bash", json!({"command": "ls"}));
        assert!(!outcome.result.skip);
    }

    #[test]
    fn advice_appears_once_threshold_reached() {
        let gate = gate_with_bash_schema();
        gate.post_call("bash", "Request timed out", 0);
        let below = gate.pre_call("bash", json!({"command": "ls"}));
        assert!(below.result.advice.is_empty());

        gate.post_call("bash", "Request timed out", 1);
        let at_threshold = gate.pre_call("bash", json!({"command": "ls"}));
        assert!(at_threshold
            .result
            .advice
            .iter()
            .any(|a| a.contains("shorter command")));
    }

    #[test]
    fn success_clears_consecutive_and_advice() {
        let gate = gate_with_bash_schema();
        gate.post_call("bash", "Request timed out", 0);
        gate.post_call("bash", "Request timed out", 1);
        gate.post_call("bash", "wrote output", 2);
        let outcome = gate.pre_call("bash", json!({"command": "ls"}));
        assert!(outcome.result.advice.is_empty());
    }

    #[test]
    fn global_threshold_injects_reassess_advice() {
        let gate = gate_with_bash_schema();
        for i in 0..5 {
            gate.post_call("bash", "error: boom", i);
        }
        let outcome = gate.pre_call("bash", json!({"command": "ls"}));
        assert!(outcome.result.advice.iter().any(|a| a.contains("Step back")));
    }
}
