//! SALUTE status reports: Status / Activity / Location / Unit / Time /
//! Environment, emitted by the Org Kernel as the public observation
//! channel for external status observers.

use crate::pace::PaceLevel;
use serde::{Deserialize, Serialize};

/// Coarse health classification surfaced in [`Status`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    /// Operating normally.
    Nominal,
    /// Degraded but still making progress.
    Degraded,
    /// Critical — likely about to escalate or abort.
    Critical,
}

/// Workflow-visible lifecycle state, mirrored into `status.state`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    /// No active task.
    Idle,
    /// Actively executing.
    Active,
    /// Waiting on an external event or tool.
    Waiting,
    /// Recovering from a failure.
    ErrorRecovery,
    /// Escalated to a higher tier/role.
    Escalating,
    /// Finished successfully.
    Complete,
    /// Terminated without completing.
    Aborted,
}

/// Overall status block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    /// Current lifecycle state.
    pub state: WorkflowStatus,
    /// Fractional progress toward the current task, 0.0-1.0.
    pub progress: f64,
    /// Current PACE tier.
    pub pace_level: PaceLevel,
    /// Coarse health classification.
    pub health: Health,
}

/// What the role is doing right now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Free-form description of the current task.
    pub current_task: Option<String>,
    /// The BST domain driving this task, if any.
    pub domain: Option<String>,
    /// The active workflow id, if any.
    pub workflow: Option<String>,
    /// The current workflow node id, if any.
    pub step: Option<String>,
    /// Total known steps in the current workflow, if known.
    pub total_steps: Option<u32>,
    /// The tool currently in flight, if any.
    pub current_tool: Option<String>,
    /// How many iterations have been spent on the current step.
    pub iterations_on_step: u32,
}

/// Where the role is operating and what it has touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    /// Current working directory, implementation-defined string.
    pub cwd: Option<String>,
    /// Files modified so far this task.
    pub files_modified: Vec<String>,
    /// Files read so far this task.
    pub files_read: Vec<String>,
    /// Named resources claimed (locks, leases), if any.
    pub resources_claimed: Vec<String>,
}

/// Chain-of-command identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// This role's id.
    pub role_id: String,
    /// The role this one reports to, if any.
    pub reports_to: Option<String>,
    /// The active organization's id.
    pub organization: String,
}

/// Timing block. `timestamp` is always the emission time; the rest
/// track task duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Time {
    /// ISO-8601 UTC emission timestamp.
    pub timestamp: String,
    /// ISO-8601 UTC task start time, if a task is in progress.
    pub task_started: Option<String>,
    /// Elapsed seconds since task start.
    pub elapsed_s: f64,
    /// Turns elapsed since task start.
    pub turns_elapsed: u64,
    /// Turns since the last measured progress.
    pub turns_since_progress: u32,
    /// Remaining context-window turns, when a context watchdog
    /// supplies it (left `None` otherwise).
    pub context_turns_remaining: Option<u32>,
}

/// Model/runtime/failure telemetry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    /// The model identifier in use, implementation-defined string.
    pub model: Option<String>,
    /// Context window fill fraction, 0.0-1.0.
    pub context_fill_pct: f64,
    /// Tokens used so far in the context window.
    pub context_tokens_used: u64,
    /// Maximum context window size in tokens.
    pub context_tokens_max: u64,
    /// Consecutive tool failures, the count PACE escalation reads.
    pub tool_failures_consecutive: u32,
    /// Total tool failures across the task.
    pub tool_failures_total: u32,
    /// Number of memory fragments stored for this session.
    pub memory_fragments_stored: u64,
}

/// The full SALUTE report: Status / Activity / Location / Unit / Time
/// / Environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaluteReport {
    /// Status block.
    pub status: Status,
    /// Activity block.
    pub activity: Activity,
    /// Location block.
    pub location: Location,
    /// Unit block.
    pub unit: Unit,
    /// Time block.
    pub time: Time,
    /// Environment block.
    pub environment: Environment,
}

impl SaluteReport {
    /// Archive filename stem, `<role_id>_<iso_timestamp>`.
    pub fn archive_key(&self) -> String {
        format!("{}_{}", self.unit.role_id, sanitize_timestamp(&self.time.timestamp))
    }

    /// Latest-overwrite key, `<role_id>_latest`.
    pub fn latest_key(&self) -> String {
        format!("{}_latest", self.unit.role_id)
    }
}

fn sanitize_timestamp(ts: &str) -> String {
    ts.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaluteReport {
        SaluteReport {
            status: Status {
                state: WorkflowStatus::Active,
                progress: 0.5,
                pace_level: PaceLevel::Primary,
                health: Health::Nominal,
            },
            activity: Activity {
                current_task: Some("refactor".into()),
                domain: Some("refactor".into()),
                workflow: None,
                step: None,
                total_steps: None,
                current_tool: None,
                iterations_on_step: 0,
            },
            location: Location::default(),
            unit: Unit {
                role_id: "bugfix_specialist".into(),
                reports_to: Some("eng_lead".into()),
                organization: "software_dev".into(),
            },
            time: Time {
                timestamp: "2026-01-01T00:00:00+00:00".into(),
                task_started: None,
                elapsed_s: 0.0,
                turns_elapsed: 0,
                turns_since_progress: 0,
                context_turns_remaining: None,
            },
            environment: Environment {
                model: None,
                context_fill_pct: 0.1,
                context_tokens_used: 100,
                context_tokens_max: 100_000,
                tool_failures_consecutive: 0,
                tool_failures_total: 0,
                memory_fragments_stored: 0,
            },
        }
    }

    #[test]
    fn archive_key_sanitizes_timestamp() {
        let report = sample();
        assert_eq!(
            report.archive_key(),
            "bugfix_specialist_2026-01-01T00-00-00-00-00"
        );
    }

    #[test]
    fn latest_key_is_stable() {
        let report = sample();
        assert_eq!(report.latest_key(), "bugfix_specialist_latest");
    }
}
