//! Static `(tool_name, error_kind) -> advice` lookup, with a fallback
//! chain to progressively less specific keys.

use crate::classify::ErrorKind;
use std::collections::BTreeMap;

/// Either a specific [`ErrorKind`] or the `any`-kind wildcard, used as
/// half of an advisor table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum KindKey {
    Specific(ErrorKind),
    Any,
}

/// Either a specific tool name or the `any`-tool wildcard, used as the
/// other half of an advisor table key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ToolKey {
    Specific(String),
    Any,
}

/// A static advice table, consulted in fallback order
/// `(tool, kind) -> (tool, any) -> (any, kind)`.
#[derive(Debug, Clone, Default)]
pub struct AdviceTable {
    entries: BTreeMap<(ToolKey, KindKey), String>,
}

impl AdviceTable {
    /// An empty table.
    pub fn new() -> Self {
        AdviceTable::default()
    }

    /// Registers advice for an exact `(tool_name, error_kind)` pair.
    pub fn set(&mut self, tool_name: impl Into<String>, error_kind: ErrorKind, advice: impl Into<String>) {
        self.entries
            .insert((ToolKey::Specific(tool_name.into()), KindKey::Specific(error_kind)), advice.into());
    }

    /// Registers advice for any failure of `tool_name`, regardless of
    /// kind.
    pub fn set_for_tool(&mut self, tool_name: impl Into<String>, advice: impl Into<String>) {
        self.entries
            .insert((ToolKey::Specific(tool_name.into()), KindKey::Any), advice.into());
    }

    /// Registers advice for `error_kind` across any tool.
    pub fn set_for_kind(&mut self, error_kind: ErrorKind, advice: impl Into<String>) {
        self.entries
            .insert((ToolKey::Any, KindKey::Specific(error_kind)), advice.into());
    }

    /// Looks up advice, trying `(tool, kind)`, then `(tool, any)`,
    /// then `(any, kind)`.
    pub fn lookup(&self, tool_name: &str, error_kind: ErrorKind) -> Option<&str> {
        self.entries
            .get(&(ToolKey::Specific(tool_name.to_string()), KindKey::Specific(error_kind)))
            .or_else(|| self.entries.get(&(ToolKey::Specific(tool_name.to_string()), KindKey::Any)))
            .or_else(|| self.entries.get(&(ToolKey::Any, KindKey::Specific(error_kind))))
            .map(|s| s.as_str())
    }
}
