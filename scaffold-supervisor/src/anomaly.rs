//! The fixed anomaly table: each variant's detection predicate and
//! its steering text, evaluated fresh every turn.

use scaffold_org::{AgentFailureState, PaceLevel};
use scaffold_tools_gate::{ErrorKind, FailureRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A detected anomaly kind. Closed, since the anomaly table itself is
/// fixed rather than user-extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// No measured progress for too many turns.
    Stall,
    /// The same tool failing with the same error kind repeatedly.
    Loop,
    /// Context window fill above the configured ceiling.
    ContextExhaustion,
    /// Several distinct tools failing within the recent window.
    CascadeFailure,
    /// PACE has escalated to contingent or emergency.
    PaceEscalation,
}

impl AnomalyKind {
    /// The fixed steering text for this anomaly, independent of the
    /// triggering state. `pace_escalation` is the one exception — its
    /// text is role-specific and supplied by the caller instead.
    pub fn steering_text(self) -> &'static str {
        match self {
            AnomalyKind::Stall => "reassess approach",
            AnomalyKind::Loop => "try a different method",
            AnomalyKind::ContextExhaustion => "wrap up current task",
            AnomalyKind::CascadeFailure => "verify environment",
            AnomalyKind::PaceEscalation => "",
        }
    }
}

/// Tunables for anomaly detection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Turns without progress before `stall` fires.
    pub max_turns_without_progress: u32,
    /// Same-tool-same-error occurrences before `loop` fires.
    pub loop_repeat_threshold: u32,
    /// Context fill fraction above which `context_exhaustion` fires.
    pub context_fill_threshold: f64,
    /// Distinct failing tools within the ring before `cascade_failure`
    /// fires.
    pub cascade_distinct_tools_threshold: usize,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        AnomalyThresholds {
            max_turns_without_progress: 5,
            loop_repeat_threshold: 3,
            context_fill_threshold: 0.80,
            cascade_distinct_tools_threshold: 3,
        }
    }
}

/// Evaluates the fixed anomaly table against this turn's state.
/// `recent_failures` is a snapshot of the tool gate's failure ring;
/// `role_pace_text` supplies the role-specific text for
/// `pace_escalation`, since that anomaly's steering isn't fixed.
pub fn detect(
    thresholds: AnomalyThresholds,
    agent_state: &AgentFailureState,
    pace_level: PaceLevel,
    recent_failures: &[FailureRecord],
) -> Vec<AnomalyKind> {
    let mut anomalies = Vec::new();

    if agent_state.turns_since_progress > thresholds.max_turns_without_progress {
        anomalies.push(AnomalyKind::Stall);
    }

    if has_repeated_tool_error(recent_failures, thresholds.loop_repeat_threshold) {
        anomalies.push(AnomalyKind::Loop);
    }

    if agent_state.context_fill_pct > thresholds.context_fill_threshold {
        anomalies.push(AnomalyKind::ContextExhaustion);
    }

    if distinct_failing_tools(recent_failures) >= thresholds.cascade_distinct_tools_threshold {
        anomalies.push(AnomalyKind::CascadeFailure);
    }

    if matches!(pace_level, PaceLevel::Contingent | PaceLevel::Emergency) {
        anomalies.push(AnomalyKind::PaceEscalation);
    }

    anomalies
}

fn has_repeated_tool_error(recent_failures: &[FailureRecord], threshold: u32) -> bool {
    let mut counts = std::collections::BTreeMap::<(String, ErrorKind), u32>::new();
    for failure in recent_failures {
        let count = counts.entry((failure.tool_name.clone(), failure.error_kind)).or_insert(0);
        *count += 1;
        if *count >= threshold {
            return true;
        }
    }
    false
}

fn distinct_failing_tools(recent_failures: &[FailureRecord]) -> usize {
    recent_failures.iter().map(|f| f.tool_name.as_str()).collect::<BTreeSet<_>>().len()
}
