//! Ordered regex classification of a tool's raw response text into a
//! fixed set of failure kinds. First match wins; no match means
//! success.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A fixed classification for a failed tool call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The call did not complete within its time budget.
    Timeout,
    /// The target of the call (file, path, symbol) doesn't exist.
    NotFound,
    /// The tool was denied access to a resource.
    Permission,
    /// Malformed or missing arguments.
    Syntax,
    /// A remote call failed at the transport layer (connection, DNS, rate limiting).
    Network,
    /// The call exhausted a local resource (memory, disk, quota).
    Resource,
    /// A required dependency (binary, module, package) is missing.
    Dependency,
    /// Failed during its own execution, not classifiable into a more specific kind.
    Execution,
}

static TIMEOUT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)time(d)?\s*out|deadline exceeded").unwrap());
static NOT_FOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)no such file|not found|does not exist|enoent").unwrap());
static PERMISSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)permission denied|access denied|forbidden|not authorized").unwrap());
static SYNTAX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)invalid argument|parse error|syntax error|malformed").unwrap());
static NETWORK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)connection refused|connection reset|network (is )?unreachable|dns|rate limit|too many requests|\b429\b")
        .unwrap()
});
static RESOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)out of memory|disk full|no space left|resource exhausted|quota exceeded").unwrap()
});
static DEPENDENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)command not found|module not found|no such command|missing dependency|cannot find package")
        .unwrap()
});
static ANY_FAILURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)error|failed|failure|exception|traceback").unwrap());

/// Classifies `response_text` into an [`ErrorKind`], checking the most
/// specific patterns first. Returns `None` on anything that doesn't
/// look like a failure at all.
pub fn classify_failure(response_text: &str) -> Option<ErrorKind> {
    if TIMEOUT_RE.is_match(response_text) {
        return Some(ErrorKind::Timeout);
    }
    if PERMISSION_RE.is_match(response_text) {
        return Some(ErrorKind::Permission);
    }
    if NOT_FOUND_RE.is_match(response_text) {
        return Some(ErrorKind::NotFound);
    }
    if DEPENDENCY_RE.is_match(response_text) {
        return Some(ErrorKind::Dependency);
    }
    if RESOURCE_RE.is_match(response_text) {
        return Some(ErrorKind::Resource);
    }
    if NETWORK_RE.is_match(response_text) {
        return Some(ErrorKind::Network);
    }
    if SYNTAX_RE.is_match(response_text) {
        return Some(ErrorKind::Syntax);
    }
    if ANY_FAILURE_RE.is_match(response_text) {
        return Some(ErrorKind::Execution);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_timeout() {
        assert_eq!(classify_failure("Request timed out after 30s"), Some(ErrorKind::Timeout));
    }

    #[test]
    fn classifies_not_found_over_generic_failure() {
        assert_eq!(
            classify_failure("Error: no such file or directory"),
            Some(ErrorKind::NotFound)
        );
    }

    #[test]
    fn success_text_classifies_to_none() {
        assert_eq!(classify_failure("wrote 12 lines to output.rs"), None);
    }

    #[test]
    fn unrecognized_failure_falls_back_to_execution() {
        assert_eq!(classify_failure("something went wrong"), Some(ErrorKind::Execution));
    }
}
