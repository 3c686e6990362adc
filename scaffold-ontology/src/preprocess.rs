//! Deterministic normalization run before any blocking or scoring:
//! name normalization, address canonicalization, date parsing, and
//! identifier extraction.

use regex::Regex;
use std::sync::LazyLock;

const HONORIFICS: &[&str] = &["mr", "mrs", "ms", "dr", "jr", "sr", "ii", "iii", "iv"];

/// Lowercases, strips honorifics, and collapses whitespace.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split_whitespace()
        .filter(|t| !HONORIFICS.contains(&t.trim_matches('.')))
        .collect();
    tokens.join(" ")
}

const ADDRESS_EXPANSIONS: &[(&str, &str)] = &[
    ("st", "street"),
    ("ave", "avenue"),
    ("blvd", "boulevard"),
    ("dr", "drive"),
    ("ln", "lane"),
    ("rd", "road"),
    ("corp", "corporation"),
    ("inc", "incorporated"),
    ("co", "company"),
    ("ltd", "limited"),
    ("llc", "llc"),
];

/// Lowercases and expands common street/company-suffix abbreviations.
pub fn canonicalize_address(address: &str) -> String {
    let lowered = address.to_lowercase();
    lowered
        .split_whitespace()
        .map(|token| {
            let stripped = token.trim_end_matches(|c: char| c == '.' || c == ',');
            ADDRESS_EXPANSIONS
                .iter()
                .find(|(abbrev, _)| *abbrev == stripped)
                .map(|(_, full)| full.to_string())
                .unwrap_or_else(|| stripped.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Parses a handful of common date shells into ISO-8601 `YYYY-MM-DD`.
/// Returns `None` on anything it doesn't recognize rather than
/// guessing.
pub fn parse_date_to_iso(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if ISO_DATE_RE.is_match(trimmed) {
        return Some(trimmed.to_string());
    }
    if let Some(caps) = SLASH_DATE_RE.captures(trimmed) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = &caps[3];
        return Some(format!("{year}-{month:02}-{day:02}"));
    }
    None
}

static EIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2}-\d{7}\b").unwrap());
static DUNS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{9}\b").unwrap());
static TICKER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$[A-Z]{1,5}\b").unwrap());

/// Extracts EIN, DUNS, and stock-ticker identifiers from free text.
pub fn extract_identifiers(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for m in EIN_RE.find_iter(text) {
        found.push(m.as_str().to_string());
    }
    for m in DUNS_RE.find_iter(text) {
        found.push(m.as_str().to_string());
    }
    for m in TICKER_RE.find_iter(text) {
        found.push(m.as_str().to_string());
    }
    found
}
