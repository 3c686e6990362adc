//! The slot taxonomy: per-domain trigger keywords, slot definitions,
//! thresholds, and preambles. Loaded once and handed to the tracker.

use serde::{Deserialize, Serialize};

/// A single slot's definition within a domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSpec {
    /// The slot's name, referenced in `[TASK CONTEXT]` and clarifying
    /// questions.
    pub name: String,
    /// Ordered resolver chain; the first resolver to return non-null
    /// wins.
    pub resolver_chain: Vec<String>,
    /// Whether this slot must be filled before the domain can proceed
    /// without a clarifying question.
    #[serde(default)]
    pub required: bool,
    /// Whether `null` is an acceptable terminal value for this slot.
    #[serde(default)]
    pub nullable: bool,
    /// The question to ask when this slot is required and unfilled.
    pub clarifying_question: String,
}

/// A domain's full classification and slot-filling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainSpec {
    /// The domain's identifier, e.g. `"refactor"`.
    pub domain: String,
    /// Human-readable description, unused by the algorithm.
    #[serde(default)]
    pub description: String,
    /// Trigger keywords searched for in the raw message. Order matters
    /// only for human readability; scoring counts matches regardless
    /// of position.
    pub trigger_keywords: Vec<String>,
    /// This domain's slots, in declaration order.
    pub slots: Vec<SlotSpec>,
    /// Minimum combined confidence required to enrich rather than
    /// clarify or pass through.
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,
    /// The `[INSTRUCTION]` preamble injected for this domain.
    #[serde(default)]
    pub preamble: String,
}

fn default_threshold() -> f64 {
    0.5
}

impl DomainSpec {
    /// Names of this domain's required slots, in declaration order.
    pub fn required_slot_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| s.required)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Look up a slot definition by name.
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }
}

/// The full, ordered set of domains BST classifies against, plus
/// globally shared settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotTaxonomy {
    /// Whether BST is active at all. A disabled taxonomy degrades the
    /// whole component to passthrough.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Domains in taxonomy order. Order is the tie-breaker when two
    /// domains score equally on trigger matches.
    pub domains: Vec<DomainSpec>,
    /// How many turns a belief state survives before expiring.
    #[serde(default = "default_ttl")]
    pub belief_state_ttl_turns: u32,
    /// Minimum trigger score a non-conversational domain must clear to
    /// even be considered; below this, `conversational` wins by
    /// default.
    #[serde(default)]
    pub minimum_trigger_floor: f64,
    /// Lexical patterns that mark a message as an anaphoric
    /// continuation of the prior turn (e.g. `"fix it"`, `"do that
    /// again"`), causing BST to reuse the existing belief state rather
    /// than reclassify.
    #[serde(default = "default_continuation_patterns")]
    pub continuation_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_ttl() -> u32 {
    6
}

fn default_continuation_patterns() -> Vec<String> {
    vec![
        "fix it".into(),
        "do that again".into(),
        "try again".into(),
        "do it again".into(),
        "same thing".into(),
        "that one".into(),
    ]
}

impl Default for SlotTaxonomy {
    fn default() -> Self {
        Self {
            enabled: true,
            domains: Vec::new(),
            belief_state_ttl_turns: default_ttl(),
            minimum_trigger_floor: 0.0,
            continuation_patterns: default_continuation_patterns(),
        }
    }
}

impl SlotTaxonomy {
    /// Look up a domain definition by name.
    pub fn domain(&self, name: &str) -> Option<&DomainSpec> {
        self.domains.iter().find(|d| d.domain == name)
    }

    /// The sentinel domain that always passes through at score zero
    /// when nothing else matches above the floor.
    pub fn conversational(&self) -> DomainSpec {
        self.domain("conversational").cloned().unwrap_or(DomainSpec {
            domain: "conversational".into(),
            description: String::new(),
            trigger_keywords: Vec::new(),
            slots: Vec::new(),
            confidence_threshold: 0.0,
            preamble: String::new(),
        })
    }
}
