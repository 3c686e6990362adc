//! Ties together role selection, PACE evaluation, and SALUTE emission
//! into the Org Kernel's per-turn pass.

use crate::pace::{self, AgentFailureState, PaceEvaluation, PaceLevel};
use crate::role::{select_role, Organization, Role};
use crate::salute::{Activity, Environment, Location, SaluteReport, Status, Time, Unit, WorkflowStatus};
use chrono::{DateTime, Utc};
use scaffold_core::outcome::{ComponentDirective, ComponentOutcome};
use serde::{Deserialize, Serialize};

/// The clean-turn count required before PACE is allowed to recover to
/// a lower tier.
const CLEAN_TURNS_BEFORE_RECOVERY: u32 = 2;

/// Per-role runtime state the kernel threads across turns. Owned by
/// the caller (typically `scaffold-pipeline`), persisted through a
/// `StateStore` keyed by role id — the kernel itself holds no state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRuntimeState {
    /// Current PACE tier.
    pub pace_level: PaceLevel,
    /// Consecutive clean turns counted toward PACE recovery.
    pub clean_turns: u32,
    /// Turns since the last SALUTE emission for this role.
    pub turns_since_salute: u32,
    /// ISO-8601 UTC timestamp the current task started, if any.
    pub task_started: Option<String>,
    /// Turns elapsed in the current task.
    pub turns_elapsed: u64,
    /// Turns since the last measured progress.
    pub turns_since_progress: u32,
    /// Workflow status as of the previous turn, compared against this
    /// turn's to decide whether a state change warrants a SALUTE
    /// emission.
    pub prior_workflow_status: Option<WorkflowStatus>,
}

impl Default for RoleRuntimeState {
    fn default() -> Self {
        Self {
            pace_level: PaceLevel::Primary,
            clean_turns: 0,
            turns_since_salute: 0,
            task_started: None,
            turns_elapsed: 0,
            turns_since_progress: 0,
            prior_workflow_status: None,
        }
    }
}

/// What the Org Kernel produced for one turn.
#[derive(Debug, Clone)]
pub struct OrgOutput {
    /// The role activated for this turn, if any. `None` means no
    /// organization is active or no role matched the domain — the
    /// turn proceeds unfiltered.
    pub active_role: Option<Role>,
    /// Updated runtime state to persist for this role.
    pub runtime_state: Option<RoleRuntimeState>,
    /// The result of this turn's PACE evaluation, if a role is active.
    pub pace: Option<PaceEvaluation>,
    /// A SALUTE report to persist, if this turn triggered an emission.
    pub salute: Option<SaluteReport>,
}

impl OrgOutput {
    fn inert() -> Self {
        Self {
            active_role: None,
            runtime_state: None,
            pace: None,
            salute: None,
        }
    }
}

/// The Organization Kernel: stateless logic over an active organization
/// and its role profiles.
pub struct OrgKernel {
    active_org: Option<Organization>,
    roles: Vec<Role>,
}

impl OrgKernel {
    /// Construct a kernel. `active_org: None` means the org layer is
    /// inert for every turn.
    pub fn new(active_org: Option<Organization>, roles: Vec<Role>) -> Self {
        Self { active_org, roles }
    }

    /// Run one turn of role routing, PACE evaluation, and (possibly)
    /// SALUTE emission.
    ///
    /// `prior_role_id` lets the caller detect a role switch — switching
    /// roles does not resume the previous role's workflow.
    /// `workflow_status` and `progress` feed the SALUTE status block;
    /// a change from the role's `prior_workflow_status` (carried in
    /// `runtime`) across any of the seven lifecycle states forces a
    /// SALUTE emission regardless of the turn-count interval.
    /// Never errors: an absent org or unmatched domain simply yields
    /// an inert [`OrgOutput`].
    pub fn process(
        &self,
        domain: &str,
        agent_state: AgentFailureState,
        runtime: Option<RoleRuntimeState>,
        workflow_status: WorkflowStatus,
        progress: f64,
        activity: Activity,
        location: Location,
        environment: Environment,
        now: DateTime<Utc>,
    ) -> ComponentOutcome<OrgOutput> {
        let Some(org) = &self.active_org else {
            tracing::debug!("no active organization; org kernel inert");
            return ComponentOutcome::proceed(OrgOutput::inert());
        };

        let Some(role) = select_role(&self.roles, domain) else {
            tracing::debug!(domain, "no role matches domain; org kernel permissive");
            return ComponentOutcome::proceed(OrgOutput::inert());
        };

        let mut state = runtime.unwrap_or_default();
        let progress_made = progress > 0.0;
        if progress_made {
            state.turns_since_progress = 0;
        } else {
            state.turns_since_progress = state.turns_since_progress.saturating_add(1);
        }
        state.turns_elapsed = state.turns_elapsed.saturating_add(1);
        if state.task_started.is_none() {
            state.task_started = Some(now.to_rfc3339());
        }

        let failure_state = AgentFailureState {
            turns_since_progress: state.turns_since_progress,
            ..agent_state
        };
        let eval = pace::evaluate(
            &role.pace_plan,
            &failure_state,
            state.pace_level,
            state.clean_turns,
            CLEAN_TURNS_BEFORE_RECOVERY,
        );
        if eval.transitioned() {
            tracing::warn!(
                role_id = %role.role_id,
                from = ?eval.previous,
                to = ?eval.current,
                "PACE transition"
            );
        }
        state.pace_level = eval.current;
        state.clean_turns = eval.clean_turns;

        state.turns_since_salute = state.turns_since_salute.saturating_add(1);
        let status_changed = state.prior_workflow_status != Some(workflow_status);
        let salute_due = eval.transitioned()
            || state.turns_since_salute >= role.doctrine.salute_interval_turns
            || status_changed;

        let salute = if salute_due {
            state.turns_since_salute = 0;
            Some(build_salute_report(
                org, role, &state, workflow_status, progress, activity, location, environment, now,
            ))
        } else {
            None
        };
        state.prior_workflow_status = Some(workflow_status);

        let directive = match eval.current {
            PaceLevel::Contingent | PaceLevel::Emergency => ComponentDirective::Escalate,
            _ => ComponentDirective::Proceed,
        };

        ComponentOutcome::with_directive(
            OrgOutput {
                active_role: Some(role.clone()),
                runtime_state: Some(state),
                pace: Some(eval),
                salute,
            },
            directive,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn build_salute_report(
    org: &Organization,
    role: &Role,
    state: &RoleRuntimeState,
    workflow_status: WorkflowStatus,
    progress: f64,
    activity: Activity,
    location: Location,
    environment: Environment,
    now: DateTime<Utc>,
) -> SaluteReport {
    let elapsed_s = state
        .task_started
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|started| (now - started.with_timezone(&Utc)).num_milliseconds() as f64 / 1000.0)
        .unwrap_or(0.0);

    let health = match state.pace_level {
        PaceLevel::Primary | PaceLevel::Alternate => crate::salute::Health::Nominal,
        PaceLevel::Contingent => crate::salute::Health::Degraded,
        PaceLevel::Emergency => crate::salute::Health::Critical,
    };

    SaluteReport {
        status: Status {
            state: workflow_status,
            progress,
            pace_level: state.pace_level,
            health,
        },
        activity,
        location,
        unit: Unit {
            role_id: role.role_id.clone(),
            reports_to: role.reports_to.clone(),
            organization: org.org_id.clone(),
        },
        time: Time {
            timestamp: now.to_rfc3339(),
            task_started: state.task_started.clone(),
            elapsed_s,
            turns_elapsed: state.turns_elapsed,
            turns_since_progress: state.turns_since_progress,
            context_turns_remaining: None,
        },
        environment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pace::{PacePlan, PaceTier, PaceTrigger};
    use crate::role::{Capabilities, Doctrine, OrgMode, RoleType};
    use std::collections::BTreeMap;

    fn org() -> Organization {
        Organization {
            org_id: "software_dev".into(),
            mission: String::new(),
            hierarchy: BTreeMap::new(),
            communication_channels: vec![],
            mode: OrgMode::Microcosm,
        }
    }

    fn role(id: &str, domains: &[&str], workflows: &[&str]) -> Role {
        Role {
            role_id: id.into(),
            role_type: RoleType::Specialist,
            authority_level: 2,
            reports_to: Some("eng_lead".into()),
            can_delegate: false,
            capabilities: Capabilities {
                domains: domains.iter().map(|s| s.to_string()).collect(),
                workflows: workflows.iter().map(|s| s.to_string()).collect(),
                tools_primary: vec![],
                tools_secondary: vec![],
            },
            requirements: vec![],
            pace_plan: PacePlan {
                primary: PaceTier {
                    trigger: PaceTrigger::Never,
                    action: String::new(),
                    escalate_to: None,
                },
                alternate: PaceTier {
                    trigger: PaceTrigger::ConsecutiveToolFailures { threshold: 3 },
                    action: "retry".into(),
                    escalate_to: None,
                },
                contingent: PaceTier {
                    trigger: PaceTrigger::ConsecutiveToolFailures { threshold: 6 },
                    action: "escalate".into(),
                    escalate_to: Some("supervisor".into()),
                },
                emergency: PaceTier {
                    trigger: PaceTrigger::UnrecoverableError,
                    action: "abort".into(),
                    escalate_to: None,
                },
            },
            doctrine: Doctrine {
                salute_interval_turns: 5,
                max_turns_without_progress: 4,
                autonomous_retry_limit: 3,
            },
        }
    }

    fn activity() -> Activity {
        Activity {
            current_task: None,
            domain: Some("bugfix".into()),
            workflow: None,
            step: None,
            total_steps: None,
            current_tool: None,
            iterations_on_step: 0,
        }
    }

    #[test]
    fn no_active_org_is_inert() {
        let kernel = OrgKernel::new(None, vec![role("spec", &["bugfix"], &[])]);
        let outcome = kernel.process(
            "bugfix",
            AgentFailureState::default(),
            None,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            Environment {
                model: None,
                context_fill_pct: 0.0,
                context_tokens_used: 0,
                context_tokens_max: 1,
                tool_failures_consecutive: 0,
                tool_failures_total: 0,
                memory_fragments_stored: 0,
            },
            Utc::now(),
        );
        assert!(outcome.result.active_role.is_none());
    }

    #[test]
    fn pace_transition_forces_salute_emission() {
        let kernel = OrgKernel::new(
            Some(org()),
            vec![role("bugfix_specialist", &["bugfix"], &["bugfix_workflow"])],
        );
        let env = Environment {
            model: None,
            context_fill_pct: 0.0,
            context_tokens_used: 0,
            context_tokens_max: 1,
            tool_failures_consecutive: 3,
            tool_failures_total: 3,
            memory_fragments_stored: 0,
        };
        let outcome = kernel.process(
            "bugfix",
            AgentFailureState {
                tool_failures_consecutive: 3,
                ..Default::default()
            },
            None,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            env,
            Utc::now(),
        );
        assert!(outcome.result.salute.is_some());
        assert_eq!(
            outcome.result.pace.as_ref().unwrap().current,
            PaceLevel::Alternate
        );
        assert_eq!(outcome.directive, ComponentDirective::Proceed);
    }

    #[test]
    fn contingent_pace_escalates_directive() {
        let kernel = OrgKernel::new(
            Some(org()),
            vec![role("bugfix_specialist", &["bugfix"], &["bugfix_workflow"])],
        );
        let env = Environment {
            model: None,
            context_fill_pct: 0.0,
            context_tokens_used: 0,
            context_tokens_max: 1,
            tool_failures_consecutive: 6,
            tool_failures_total: 6,
            memory_fragments_stored: 0,
        };
        let outcome = kernel.process(
            "bugfix",
            AgentFailureState {
                tool_failures_consecutive: 6,
                ..Default::default()
            },
            None,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            env,
            Utc::now(),
        );
        assert_eq!(outcome.directive, ComponentDirective::Escalate);
    }

    #[test]
    fn idle_to_active_transition_forces_salute_without_pace_change() {
        let kernel = OrgKernel::new(
            Some(org()),
            vec![role("bugfix_specialist", &["bugfix"], &["bugfix_workflow"])],
        );
        let env = Environment {
            model: None,
            context_fill_pct: 0.0,
            context_tokens_used: 0,
            context_tokens_max: 1,
            tool_failures_consecutive: 0,
            tool_failures_total: 0,
            memory_fragments_stored: 0,
        };
        let first = kernel.process(
            "bugfix",
            AgentFailureState::default(),
            None,
            WorkflowStatus::Idle,
            0.0,
            activity(),
            Location::default(),
            env.clone(),
            Utc::now(),
        );
        assert!(first.result.salute.is_some(), "first turn always emits");
        let runtime = first.result.runtime_state;

        let second = kernel.process(
            "bugfix",
            AgentFailureState::default(),
            runtime,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            env,
            Utc::now(),
        );
        assert!(second.result.salute.is_some(), "idle -> active should force a SALUTE");
    }

    #[test]
    fn unchanged_status_below_interval_does_not_force_salute() {
        let kernel = OrgKernel::new(
            Some(org()),
            vec![role("bugfix_specialist", &["bugfix"], &["bugfix_workflow"])],
        );
        let env = Environment {
            model: None,
            context_fill_pct: 0.0,
            context_tokens_used: 0,
            context_tokens_max: 1,
            tool_failures_consecutive: 0,
            tool_failures_total: 0,
            memory_fragments_stored: 0,
        };
        let first = kernel.process(
            "bugfix",
            AgentFailureState::default(),
            None,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            env.clone(),
            Utc::now(),
        );
        let runtime = first.result.runtime_state;

        let second = kernel.process(
            "bugfix",
            AgentFailureState::default(),
            runtime,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            env,
            Utc::now(),
        );
        assert!(
            second.result.salute.is_none(),
            "unchanged status well under the salute interval should stay quiet"
        );
    }

    #[test]
    fn role_filter_soundness_workflow_whitelist_carried() {
        let kernel = OrgKernel::new(
            Some(org()),
            vec![role("bugfix_specialist", &["bugfix"], &["bugfix_workflow", "log_investigation"])],
        );
        let env = Environment {
            model: None,
            context_fill_pct: 0.0,
            context_tokens_used: 0,
            context_tokens_max: 1,
            tool_failures_consecutive: 0,
            tool_failures_total: 0,
            memory_fragments_stored: 0,
        };
        let outcome = kernel.process(
            "bugfix",
            AgentFailureState::default(),
            None,
            WorkflowStatus::Active,
            0.0,
            activity(),
            Location::default(),
            env,
            Utc::now(),
        );
        let active = outcome.result.active_role.unwrap();
        assert_eq!(
            active.capabilities.workflows,
            vec!["bugfix_workflow".to_string(), "log_investigation".to_string()]
        );
    }
}
