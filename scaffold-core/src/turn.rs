//! The Turn protocol — the boundary one cognitive cycle crosses: input
//! in, response and declared effects out.

use crate::{content::Content, duration::DurationMs, effect::Effect, error::TurnError, id::*};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What triggers a turn. Shapes context assembly: a scheduled trigger
/// has nothing to build on but persisted state, while a user message
/// already carries its own conversational context.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    /// Human sent a message.
    User,
    /// Another agent assigned a task.
    Task,
    /// Signal from another workflow/agent.
    Signal,
    /// Cron/schedule triggered.
    Schedule,
    /// System event (file change, webhook, etc.).
    SystemEvent,
    /// Future trigger types.
    Custom(String),
}

/// Input to a turn. Everything the turn needs to execute.
///
/// `TurnInput` never carries conversation history or memory contents
/// itself — those live in a `StateStore` and the turn reads them
/// during context assembly. What it carries is only the *new* thing
/// that triggered this turn.
///
/// That split keeps the boundary clean: the caller hands over what's
/// new, and the turn decides how to combine it with what's stored.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnInput {
    /// The new message/task/signal that triggered this turn.
    pub message: Content,

    /// What caused this turn to start.
    pub trigger: TriggerType,

    /// Session for conversation continuity. If None, the turn is stateless.
    /// The turn runtime uses this to read history from the StateStore.
    pub session: Option<SessionId>,

    /// Configuration for this specific turn execution.
    /// None means "use the turn runtime's defaults."
    pub config: Option<TurnConfig>,

    /// Opaque metadata carried through the turn untouched — tracing
    /// ids, routing hints, or anything else the protocol itself has
    /// no business understanding.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Per-turn configuration overrides. Every field is optional —
/// None means "use the implementation's default."
#[non_exhaustive]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnConfig {
    /// Maximum iterations of the inner ReAct loop.
    pub max_turns: Option<u32>,

    /// Maximum cost for this turn in USD.
    pub max_cost: Option<Decimal>,

    /// Maximum wall-clock time for this turn.
    pub max_duration: Option<DurationMs>,

    /// Model override (implementation-specific string).
    pub model: Option<String>,

    /// Tool restrictions for this turn.
    /// None = use defaults. Some(list) = only these tools.
    pub allowed_tools: Option<Vec<String>>,

    /// Additional system prompt content to prepend/append.
    /// Does not replace the turn runtime's base identity —
    /// it augments it. Use for per-task instructions.
    pub system_addendum: Option<String>,
}

/// Why a turn ended — the caller's cue for whether to retry,
/// continue, or escalate.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Model produced a final text response (natural completion).
    Complete,
    /// Hit the max_turns limit.
    MaxTurns,
    /// Hit the cost budget.
    BudgetExhausted,
    /// Circuit breaker tripped (consecutive failures).
    CircuitBreaker,
    /// Wall-clock timeout.
    Timeout,
    /// Observer/guardrail halted execution.
    ObserverHalt {
        /// The reason the observer halted execution.
        reason: String,
    },
    /// Unrecoverable error during execution.
    Error,
    /// Future exit reasons.
    Custom(String),
}

/// Output from a turn. Contains the response, metadata about
/// execution, and any side-effects the turn wants executed.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutput {
    /// The turn's response content.
    pub message: Content,

    /// Why the turn ended.
    pub exit_reason: ExitReason,

    /// Execution metadata (cost, tokens, timing).
    pub metadata: TurnMetadata,

    /// Side-effects the turn wants executed.
    ///
    /// The turn only declares these, never executes them itself — the
    /// calling layer decides when and how. That split is what lets the
    /// same turn run in-process with effects applied immediately, or
    /// under an orchestrator that serializes and replays them, without
    /// the turn code knowing or caring which.
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// Execution metadata. Every field is concrete rather than optional —
/// every turn produces this data, even if an implementation that
/// can't track a particular field (cost for a local model, say)
/// reports a default of zero.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMetadata {
    /// Input tokens consumed.
    pub tokens_in: u64,
    /// Output tokens generated.
    pub tokens_out: u64,
    /// Cost in USD.
    pub cost: Decimal,
    /// Number of ReAct loop iterations used.
    pub turns_used: u32,
    /// Record of each tool call made.
    pub tools_called: Vec<ToolCallRecord>,
    /// Wall-clock duration of the turn.
    pub duration: DurationMs,
}

/// Record of a single tool invocation within a turn.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Name of the tool that was called.
    pub name: String,
    /// How long the tool call took.
    pub duration: DurationMs,
    /// Whether the call succeeded.
    pub success: bool,
}

impl Default for TurnMetadata {
    fn default() -> Self {
        Self {
            tokens_in: 0,
            tokens_out: 0,
            cost: Decimal::ZERO,
            turns_used: 0,
            tools_called: vec![],
            duration: DurationMs::ZERO,
        }
    }
}

impl TurnInput {
    /// Create a new TurnInput with required fields.
    pub fn new(message: Content, trigger: TriggerType) -> Self {
        Self {
            message,
            trigger,
            session: None,
            config: None,
            metadata: serde_json::Value::Null,
        }
    }
}

impl TurnOutput {
    /// Create a new TurnOutput with required fields.
    pub fn new(message: Content, exit_reason: ExitReason) -> Self {
        Self {
            message,
            exit_reason,
            metadata: TurnMetadata::default(),
            effects: vec![],
        }
    }
}

impl ToolCallRecord {
    /// Create a new ToolCallRecord.
    pub fn new(name: impl Into<String>, duration: DurationMs, success: bool) -> Self {
        Self {
            name: name.into(),
            duration,
            success,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// THE TRAIT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The Turn boundary.
///
/// Whatever an implementation does internally — one model call or a
/// whole reason/act/observe loop — from the outside a turn is atomic:
/// input goes in, output comes out.
///
/// Implementations:
/// - `CognitiveCore` (the eight cognitive components wrapped around
///   one model call)
/// - A raw API call wrapper (minimal, no tools)
/// - A human-in-the-loop adapter (waits for human input)
/// - `EchoTurn` (for testing)
///
/// Deliberately a single method. What happens inside — how many model
/// calls, how many tool uses, what context strategy — is entirely the
/// implementation's business.
#[async_trait]
pub trait Turn: Send + Sync {
    /// Execute a single turn.
    ///
    /// May read from a `StateStore` while assembling context, but must
    /// never write to external state directly — writes are declared
    /// as `Effect`s in the returned output instead.
    async fn execute(&self, input: TurnInput) -> Result<TurnOutput, TurnError>;
}
