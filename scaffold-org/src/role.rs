//! Role and Organization data model.

use crate::pace::PacePlan;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A role's place in the hierarchy and its chain-of-command authority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RoleType {
    /// Top of a hierarchy branch.
    Commander,
    /// Mid-tier, delegates to specialists.
    Executive,
    /// Narrowest capability set, most specific domain match.
    Specialist,
}

impl RoleType {
    /// Preference rank used when multiple roles match a domain:
    /// specialist beats executive beats commander. Lower is preferred.
    fn preference_rank(self) -> u8 {
        match self {
            RoleType::Specialist => 0,
            RoleType::Executive => 1,
            RoleType::Commander => 2,
        }
    }
}

/// A role's allowed domains, workflows, and tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// BST domains this role is eligible to handle.
    pub domains: BTreeSet<String>,
    /// Workflow IDs this role may select from. Empty means "all
    /// workflows allowed" (backward compatibility).
    pub workflows: Vec<String>,
    /// Tools this role reaches for first.
    #[serde(default)]
    pub tools_primary: Vec<String>,
    /// Tools this role falls back to.
    #[serde(default)]
    pub tools_secondary: Vec<String>,
}

/// Operational doctrine independent of PACE: cadence and patience
/// thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctrine {
    /// How often (in turns) this role emits a SALUTE report absent any
    /// other trigger.
    #[serde(default = "default_salute_interval")]
    pub salute_interval_turns: u32,
    /// Turns without measurable progress before the `stall` anomaly
    /// fires (consumed by `scaffold-supervisor`).
    #[serde(default = "default_max_turns_without_progress")]
    pub max_turns_without_progress: u32,
    /// How many autonomous retries this role attempts before
    /// escalating.
    #[serde(default = "default_autonomous_retry_limit")]
    pub autonomous_retry_limit: u32,
}

fn default_salute_interval() -> u32 {
    5
}
fn default_max_turns_without_progress() -> u32 {
    4
}
fn default_autonomous_retry_limit() -> u32 {
    3
}

impl Default for Doctrine {
    fn default() -> Self {
        Self {
            salute_interval_turns: default_salute_interval(),
            max_turns_without_progress: default_max_turns_without_progress(),
            autonomous_retry_limit: default_autonomous_retry_limit(),
        }
    }
}

/// A full role profile: identity, authority, capabilities, PACE plan,
/// and doctrine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// Unique role identifier, also the SALUTE report filename stem.
    pub role_id: String,
    /// This role's place in the hierarchy.
    pub role_type: RoleType,
    /// Authority level, 1 (highest) through 3.
    pub authority_level: u8,
    /// The role this one escalates to, if any.
    pub reports_to: Option<String>,
    /// Whether this role may delegate work to subordinates.
    #[serde(default)]
    pub can_delegate: bool,
    /// What this role is allowed to touch.
    pub capabilities: Capabilities,
    /// Free-form prerequisites, not interpreted by the kernel.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// The four-tier failure-response plan.
    pub pace_plan: PacePlan,
    /// Cadence and patience doctrine.
    #[serde(default)]
    pub doctrine: Doctrine,
}

/// Deployment mode: one process sharing role state, or one process per
/// role coordinating via the filesystem.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrgMode {
    /// All roles share one process.
    Microcosm,
    /// Each role runs in its own process/container.
    Macrocosm,
}

/// A directed hierarchy of roles with a mission. Exactly one
/// organization is active at a time, tracked by a sentinel record kept
/// outside this type (see [`crate::OrgKernel`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    /// Unique organization identifier.
    pub org_id: String,
    /// The organization's stated mission, unused by routing logic.
    #[serde(default)]
    pub mission: String,
    /// Maps a role id to the set of role ids reporting to it.
    #[serde(default)]
    pub hierarchy: BTreeMap<String, BTreeSet<String>>,
    /// Named channels roles use to address each other; not interpreted
    /// here beyond being carried in config.
    #[serde(default)]
    pub communication_channels: Vec<String>,
    /// Single-process or multi-process deployment.
    pub mode: OrgMode,
}

/// Select the active role for a domain from the set of role profiles
/// the active organization references.
///
/// Preference when multiple roles match: specialist > executive >
/// commander; ties broken by `role_id` lexical order. Returns `None`
/// when no role's capability domains include `domain` — the caller
/// treats that as "no role active, downstream filters permissive."
pub fn select_role<'a>(roles: &'a [Role], domain: &str) -> Option<&'a Role> {
    roles
        .iter()
        .filter(|r| r.capabilities.domains.contains(domain))
        .min_by(|a, b| {
            a.role_type
                .preference_rank()
                .cmp(&b.role_type.preference_rank())
                .then_with(|| a.role_id.cmp(&b.role_id))
        })
}
