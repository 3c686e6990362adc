//! Slot resolvers: pure functions over `(message, recent_history,
//! belief_state)` that attempt to fill one slot value.
//!
//! The canonical set named by the taxonomy's resolver chains:
//! `keyword_map`, `file_extension_inference`, `last_mentioned_file`,
//! `last_mentioned_path`, `last_mentioned_entity`, `history_scan`,
//! `context_inference`. Unknown resolver names are treated as
//! always-null, matching the "degrade, never block" failure posture.

use crate::belief_state::BeliefState;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Input available to every resolver. Resolvers never mutate; they
/// inspect and return `Option<Value>`.
pub struct ResolverInput<'a> {
    /// The raw current user message.
    pub message: &'a str,
    /// Recent prior user messages, most recent first.
    pub recent_history: &'a [String],
    /// The belief state carried from the previous turn, if any.
    pub belief_state: Option<&'a BeliefState>,
    /// A static keyword -> value map used by `keyword_map`.
    pub keyword_map: &'a [(String, Value)],
}

/// A named, pure slot-resolution function.
pub type SlotResolver = fn(&ResolverInput) -> Option<Value>;

/// Resolve a resolver chain name to its function, or `None` for an
/// unrecognized name (which resolves to always-null, not an error).
pub fn lookup(name: &str) -> Option<SlotResolver> {
    match name {
        "keyword_map" => Some(keyword_map as SlotResolver),
        "file_extension_inference" => Some(file_extension_inference as SlotResolver),
        "last_mentioned_file" => Some(last_mentioned_file as SlotResolver),
        "last_mentioned_path" => Some(last_mentioned_path as SlotResolver),
        "last_mentioned_entity" => Some(last_mentioned_entity as SlotResolver),
        "history_scan" => Some(history_scan as SlotResolver),
        "context_inference" => Some(context_inference as SlotResolver),
        _ => None,
    }
}

/// Run a resolver chain in order; the first non-null result wins.
pub fn run_chain(chain: &[String], input: &ResolverInput) -> Option<Value> {
    for name in chain {
        if let Some(resolver) = lookup(name) {
            if let Some(value) = resolver(input) {
                return Some(value);
            }
        }
    }
    None
}

static FILE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[A-Za-z0-9_./\\-]+\.(rs|py|js|ts|tsx|jsx|go|java|rb|c|h|cpp|hpp|toml|json|yaml|yml|md)",
    )
    .expect("static pattern is valid")
});

static SLASH_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/|\./)[A-Za-z0-9_./\\-]+").expect("static pattern is valid"));

static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]{2,64})""#).expect("static pattern is valid"));

fn keyword_map(input: &ResolverInput) -> Option<Value> {
    let lower = input.message.to_lowercase();
    input
        .keyword_map
        .iter()
        .find(|(kw, _)| lower.contains(kw.as_str()))
        .map(|(_, v)| v.clone())
}

/// Matches a bare filename with a recognized extension anywhere in the
/// message, e.g. `agent/auth.py`.
fn file_extension_inference(input: &ResolverInput) -> Option<Value> {
    FILE_PATH_RE
        .find(input.message)
        .map(|m| Value::String(m.as_str().to_string()))
}

fn last_mentioned_file(input: &ResolverInput) -> Option<Value> {
    input
        .recent_history
        .iter()
        .find_map(|line| FILE_PATH_RE.find(line))
        .map(|m| Value::String(m.as_str().to_string()))
}

fn last_mentioned_path(input: &ResolverInput) -> Option<Value> {
    input
        .recent_history
        .iter()
        .find_map(|line| SLASH_PATH_RE.find(line))
        .map(|m| Value::String(m.as_str().to_string()))
}

/// A weak heuristic: the last quoted span mentioned in history, used
/// as a fallback entity name.
fn last_mentioned_entity(input: &ResolverInput) -> Option<Value> {
    input
        .recent_history
        .iter()
        .find_map(|line| QUOTED_RE.captures(line))
        .map(|caps| Value::String(caps[1].to_string()))
}

/// Scans the full recent history (not just the latest line) for a
/// keyword-map hit, as a weaker fallback than `keyword_map` over the
/// current message alone.
fn history_scan(input: &ResolverInput) -> Option<Value> {
    input.recent_history.iter().find_map(|line| {
        let lower = line.to_lowercase();
        input
            .keyword_map
            .iter()
            .find(|(kw, _)| lower.contains(kw.as_str()))
            .map(|(_, v)| v.clone())
    })
}

/// Reuses a previously filled value from the prior belief state for
/// the same slot name, when the message didn't reassert it. Caller
/// supplies the slot name via closures at the call site in practice;
/// this resolver alone has no slot-name context and always defers.
fn context_inference(input: &ResolverInput) -> Option<Value> {
    input.belief_state?;
    None
}
