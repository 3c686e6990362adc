//! Query expansion: `original`, `keyword`, and `domain`-prefixed
//! variants derived from a single user message.

/// One expanded query to issue against the similarity backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryVariant {
    /// `original`, `keyword`, or `domain`.
    pub label: &'static str,
    /// The text to issue as a query.
    pub text: String,
}

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "is", "are", "was", "were", "be", "been", "being", "to",
    "of", "in", "on", "for", "with", "at", "by", "from", "this", "that", "it", "as", "i", "you",
    "me", "my", "your", "please", "can", "could", "would", "should", "will", "do", "does", "did",
    "have", "has", "had",
];

/// Produces the `original`, `keyword`, and (if `domain` is present)
/// `domain`-prefixed query variants for `message`.
pub fn expand_queries(message: &str, domain: Option<&str>, max_keyword_tokens: usize) -> Vec<QueryVariant> {
    let mut variants = vec![QueryVariant {
        label: "original",
        text: message.to_string(),
    }];

    let keyword_tokens: Vec<&str> = message
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .filter(|t| !STOPWORDS.contains(&t.to_lowercase().as_str()))
        .take(max_keyword_tokens)
        .collect();
    let keyword_text = keyword_tokens.join(" ");

    if !keyword_text.is_empty() {
        variants.push(QueryVariant {
            label: "keyword",
            text: keyword_text.clone(),
        });
    }

    if let Some(domain) = domain {
        if !keyword_text.is_empty() {
            variants.push(QueryVariant {
                label: "domain",
                text: format!("{}: {}", domain, keyword_text),
            });
        }
    }

    variants
}
