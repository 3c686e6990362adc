//! PACE: four-tier failure-response doctrine (primary, alternate,
//! contingent, emergency), evaluated every turn from agent state.

use serde::{Deserialize, Serialize};

/// The four PACE tiers, ordered from normal operation to full
/// escalation. `Ord` reflects the escalation order so `max()` picks
/// the most severe active tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PaceLevel {
    /// Normal operation.
    Primary,
    /// Self-recovery in progress.
    Alternate,
    /// Escalated to the supervisor.
    Contingent,
    /// Abort and report.
    Emergency,
}

/// A single PACE tier's trigger predicate and response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaceTier {
    /// The condition that activates this tier.
    pub trigger: PaceTrigger,
    /// Free-form action text surfaced to the model/operator.
    #[serde(default)]
    pub action: String,
    /// The role to escalate to if this tier persists, if any.
    #[serde(default)]
    pub escalate_to: Option<String>,
}

/// A deterministic predicate over current agent state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaceTrigger {
    /// Fires when `tool_failures_consecutive >= threshold` for the
    /// current tool.
    ConsecutiveToolFailures {
        /// Minimum consecutive failures to trigger.
        threshold: u32,
    },
    /// Fires when the turn count since the last measured progress
    /// exceeds `threshold`.
    TurnsSinceProgress {
        /// Minimum stalled turns to trigger.
        threshold: u32,
    },
    /// Fires when the context window fill fraction exceeds
    /// `threshold` (0.0-1.0).
    ContextFillAbove {
        /// Minimum fill fraction to trigger.
        threshold: f64,
    },
    /// Fires when the agent state's unrecoverable-error flag is set.
    UnrecoverableError,
    /// Never fires; used for the primary tier in a permissive plan.
    Never,
    /// Always fires; degenerate/test plans only.
    Always,
}

impl PaceTrigger {
    /// Evaluate this trigger against the current state snapshot.
    pub fn evaluate(&self, state: &AgentFailureState) -> bool {
        match self {
            PaceTrigger::ConsecutiveToolFailures { threshold } => {
                state.tool_failures_consecutive >= *threshold
            }
            PaceTrigger::TurnsSinceProgress { threshold } => {
                state.turns_since_progress >= *threshold
            }
            PaceTrigger::ContextFillAbove { threshold } => state.context_fill_pct >= *threshold,
            PaceTrigger::UnrecoverableError => state.unrecoverable_error,
            PaceTrigger::Never => false,
            PaceTrigger::Always => true,
        }
    }
}

/// The current agent-state signals PACE evaluates against.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentFailureState {
    /// Consecutive failures of the most recently invoked tool.
    pub tool_failures_consecutive: u32,
    /// Turns elapsed since the last measured progress event.
    pub turns_since_progress: u32,
    /// Fraction of the context window currently used, 0.0-1.0.
    pub context_fill_pct: f64,
    /// Whether an unrecoverable error occurred this turn.
    pub unrecoverable_error: bool,
}

/// The full four-tier plan for one role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacePlan {
    /// Normal-operation tier.
    pub primary: PaceTier,
    /// Self-recovery tier.
    pub alternate: PaceTier,
    /// Escalate-to-supervisor tier.
    pub contingent: PaceTier,
    /// Abort-and-report tier.
    pub emergency: PaceTier,
}

impl PacePlan {
    /// A plan whose only tier that can ever fire is primary — useful
    /// for roles/tests that don't exercise failure escalation.
    pub fn permissive() -> Self {
        let tier = |trigger: PaceTrigger| PaceTier {
            trigger,
            action: String::new(),
            escalate_to: None,
        };
        Self {
            primary: tier(PaceTrigger::Never),
            alternate: tier(PaceTrigger::Never),
            contingent: tier(PaceTrigger::Never),
            emergency: tier(PaceTrigger::Never),
        }
    }

    fn tier_for(&self, level: PaceLevel) -> &PaceTier {
        match level {
            PaceLevel::Primary => &self.primary,
            PaceLevel::Alternate => &self.alternate,
            PaceLevel::Contingent => &self.contingent,
            PaceLevel::Emergency => &self.emergency,
        }
    }

    /// The highest tier whose trigger currently holds. Primary is the
    /// floor — it always "holds" in the sense that if nothing else
    /// fires, the result is Primary regardless of `self.primary`'s own
    /// trigger.
    fn highest_active_tier(&self, state: &AgentFailureState) -> PaceLevel {
        for level in [PaceLevel::Emergency, PaceLevel::Contingent, PaceLevel::Alternate] {
            if self.tier_for(level).trigger.evaluate(state) {
                return level;
            }
        }
        PaceLevel::Primary
    }
}

/// Outcome of one PACE evaluation pass, including whether a transition
/// occurred (which forces an immediate SALUTE emission).
#[derive(Debug, Clone, PartialEq)]
pub struct PaceEvaluation {
    /// The level in effect before this evaluation.
    pub previous: PaceLevel,
    /// The level in effect after this evaluation.
    pub current: PaceLevel,
    /// How many consecutive turns all higher tiers' triggers have been
    /// false, used to gate recovery.
    pub clean_turns: u32,
}

impl PaceEvaluation {
    /// Whether this evaluation represents a level change.
    pub fn transitioned(&self) -> bool {
        self.previous != self.current
    }
}

/// Evaluate PACE for one turn.
///
/// The current tier is the highest whose trigger holds; escalating to
/// a higher tier is immediate, but recovering to a lower tier only
/// happens once all higher tiers' triggers have been false for two
/// consecutive turns — `clean_turns_before_recovery` is passed in as
/// `2` by convention.
pub fn evaluate(
    plan: &PacePlan,
    state: &AgentFailureState,
    previous: PaceLevel,
    previous_clean_turns: u32,
    clean_turns_before_recovery: u32,
) -> PaceEvaluation {
    let highest_active = plan.highest_active_tier(state);

    if highest_active >= previous {
        return PaceEvaluation {
            previous,
            current: highest_active,
            clean_turns: 0,
        };
    }

    // No tier above `previous` is firing this turn — count toward recovery.
    let clean_turns = previous_clean_turns + 1;
    if clean_turns >= clean_turns_before_recovery {
        PaceEvaluation {
            previous,
            current: highest_active,
            clean_turns: 0,
        }
    } else {
        PaceEvaluation {
            previous,
            current: previous,
            clean_turns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> PacePlan {
        PacePlan {
            primary: PaceTier {
                trigger: PaceTrigger::Never,
                action: String::new(),
                escalate_to: None,
            },
            alternate: PaceTier {
                trigger: PaceTrigger::ConsecutiveToolFailures { threshold: 3 },
                action: "retry with alternate tool".into(),
                escalate_to: None,
            },
            contingent: PaceTier {
                trigger: PaceTrigger::ConsecutiveToolFailures { threshold: 6 },
                action: "escalate to supervisor".into(),
                escalate_to: Some("supervisor".into()),
            },
            emergency: PaceTier {
                trigger: PaceTrigger::UnrecoverableError,
                action: "abort and report".into(),
                escalate_to: Some("commander".into()),
            },
        }
    }

    #[test]
    fn escalates_on_third_consecutive_failure() {
        let p = plan();
        let state = AgentFailureState {
            tool_failures_consecutive: 3,
            ..Default::default()
        };
        let eval = evaluate(&p, &state, PaceLevel::Primary, 0, 2);
        assert_eq!(eval.current, PaceLevel::Alternate);
        assert!(eval.transitioned());
    }

    #[test]
    fn monotonic_within_a_streak() {
        let p = plan();
        let state = AgentFailureState {
            tool_failures_consecutive: 3,
            ..Default::default()
        };
        let eval1 = evaluate(&p, &state, PaceLevel::Alternate, 0, 2);
        assert_eq!(eval1.current, PaceLevel::Alternate);
        let eval2 = evaluate(&p, &state, eval1.current, eval1.clean_turns, 2);
        assert_eq!(eval2.current, PaceLevel::Alternate);
    }

    #[test]
    fn recovers_after_two_clean_turns() {
        let p = plan();
        let failing = AgentFailureState {
            tool_failures_consecutive: 3,
            ..Default::default()
        };
        let clean = AgentFailureState::default();

        let after_failure = evaluate(&p, &failing, PaceLevel::Primary, 0, 2);
        assert_eq!(after_failure.current, PaceLevel::Alternate);

        let clean1 = evaluate(&p, &clean, after_failure.current, after_failure.clean_turns, 2);
        assert_eq!(clean1.current, PaceLevel::Alternate, "one clean turn is not enough");

        let clean2 = evaluate(&p, &clean, clean1.current, clean1.clean_turns, 2);
        assert_eq!(clean2.current, PaceLevel::Primary);
    }

    #[test]
    fn unrecoverable_error_jumps_to_emergency() {
        let p = plan();
        let state = AgentFailureState {
            unrecoverable_error: true,
            ..Default::default()
        };
        let eval = evaluate(&p, &state, PaceLevel::Primary, 0, 2);
        assert_eq!(eval.current, PaceLevel::Emergency);
    }
}
