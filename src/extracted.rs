//! Plain-text body processing: whitespace normalization and link extraction

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s<>]+").unwrap());

/// A decoded `text/plain` body part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    /// Decoded text as it appeared in the part
    pub raw: String,

    /// `raw` with every whitespace run collapsed to one space
    pub normalized: String,

    /// Distinct http(s) links found in the text
    pub links: BTreeSet<String>,
}

impl TextPart {
    /// Build a text part from decoded text
    #[must_use]
    pub fn new(raw: String) -> Self {
        let normalized = normalize_whitespace(&raw);
        let links = extract_links(&raw);
        Self {
            raw,
            normalized,
            links,
        }
    }
}

/// Collapse every run of whitespace, CR/LF and TAB included, to one space
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text, " ").into_owned()
}

/// Find distinct `http`/`https` links in text.
///
/// A link must start the text or follow whitespace or `<`, and runs until
/// whitespace, an angle bracket or the end of the text. Scheme matching is
/// case-insensitive.
#[must_use]
pub fn extract_links(text: &str) -> BTreeSet<String> {
    URL_REGEX
        .find_iter(text)
        .filter(|m| {
            text[..m.start()]
                .chars()
                .next_back()
                .is_none_or(|c| c.is_whitespace() || c == '<')
        })
        .map(|m| m.as_str().to_string())
        .collect()
}
