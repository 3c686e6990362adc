//! Orchestrates one post-turn supervisor pass: detect anomalies,
//! filter through cooldowns, and assemble the steering messages for
//! the next turn.

use crate::anomaly::{detect, AnomalyKind, AnomalyThresholds};
use crate::cooldown::CooldownTracker;
use scaffold_core::outcome::ComponentOutcome;
use scaffold_org::{AgentFailureState, PaceLevel};
use scaffold_tools_gate::FailureRecord;
use serde::{Deserialize, Serialize};

/// Tunables for the supervisor pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Master switch; disabled means no anomalies are ever raised.
    pub enabled: bool,
    /// Turns an anomaly kind must stay quiet before it can fire again.
    pub cooldown_turns: u64,
    /// Detection thresholds for the fixed anomaly table.
    pub thresholds: AnomalyThresholds,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        SupervisorConfig {
            enabled: true,
            cooldown_turns: 3,
            thresholds: AnomalyThresholds::default(),
        }
    }
}

/// One anomaly that survived cooldown gating, paired with its
/// steering text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteeringMessage {
    /// The anomaly kind that produced this message.
    pub kind: AnomalyKind,
    /// Additive context injected into the next turn. Never replaces
    /// the workflow's current-node instruction.
    pub text: String,
}

/// What the supervisor reports for a turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupervisorOutput {
    /// Anomalies detected this turn, before cooldown filtering.
    pub detected: Vec<AnomalyKind>,
    /// Steering messages to inject into the next turn, after cooldown
    /// filtering.
    pub steering: Vec<SteeringMessage>,
}

/// Runs the post-turn anomaly scan and steering injection, holding
/// cooldown state across turns.
#[derive(Debug, Default)]
pub struct Supervisor {
    config: SupervisorConfig,
    cooldowns: CooldownTracker,
}

impl Supervisor {
    /// Builds a supervisor with the given configuration and no
    /// cooldown history.
    pub fn new(config: SupervisorConfig) -> Self {
        Supervisor {
            config,
            cooldowns: CooldownTracker::new(),
        }
    }

    /// Scans `agent_state`/`pace_level`/`recent_failures` for
    /// anomalies, gates each through its cooldown, and returns the
    /// steering messages to inject next turn. `pace_escalation`'s text
    /// comes from `role_pace_text` since it's role-specific, not
    /// fixed.
    pub fn scan(
        &mut self,
        current_turn: u64,
        agent_state: &AgentFailureState,
        pace_level: PaceLevel,
        recent_failures: &[FailureRecord],
        role_pace_text: &str,
    ) -> ComponentOutcome<SupervisorOutput> {
        if !self.config.enabled {
            return ComponentOutcome::proceed(SupervisorOutput::default()).note("supervisor disabled, passthrough");
        }

        let detected = detect(self.config.thresholds, agent_state, pace_level, recent_failures);
        let mut steering = Vec::new();

        for kind in &detected {
            if !self.cooldowns.is_ready(*kind, current_turn, self.config.cooldown_turns) {
                continue;
            }
            let text = if *kind == AnomalyKind::PaceEscalation {
                role_pace_text.to_string()
            } else {
                kind.steering_text().to_string()
            };
            if *kind == AnomalyKind::PaceEscalation {
                tracing::warn!(turn = current_turn, "pace escalation anomaly, steering injected");
            } else {
                tracing::debug!(turn = current_turn, anomaly = ?kind, "steering message injected");
            }
            steering.push(SteeringMessage { kind: *kind, text });
            self.cooldowns.record_fired(*kind, current_turn);
        }

        let mut outcome = ComponentOutcome::proceed(SupervisorOutput { detected, steering });
        if !outcome.result.steering.is_empty() {
            let note = format!("{} steering message(s) injected", outcome.result.steering.len());
            outcome = outcome.note(note);
        }
        outcome
    }
}
