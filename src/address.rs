//! From, To and Cc header parsing
//!
//! These operate on header text that has already been run through
//! [`crate::decode_header`]; the normalizer handles decoding.

use crate::error::{NormalizeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static FOLDING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\n\r\t]+").unwrap());

/// Sender split into display name and bare address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromAddress {
    /// Combined text, e.g. `John Doe <john@example.com>`
    pub raw: String,

    /// Display name, empty when the header holds a bare address
    pub name: String,

    /// Address without angle brackets
    pub email: String,
}

impl FromAddress {
    /// Split decoded From text into name and address.
    ///
    /// With a `<...>` group the name is everything before the last group
    /// and the address is its contents. Without one the whole text is the
    /// address.
    #[must_use]
    pub fn parse(decoded: &str) -> Self {
        let text = decoded.trim();
        match split_bracketed(text) {
            Some((name, email)) => Self {
                raw: text.to_string(),
                name: name.trim().to_string(),
                email: email.trim().to_string(),
            },
            None => Self {
                raw: text.to_string(),
                name: String::new(),
                email: text.to_string(),
            },
        }
    }
}

/// One Cc recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CcRecipient {
    /// The comma-separated segment this recipient came from
    pub raw: String,

    /// Display name, empty for bare addresses
    pub display_name: String,

    /// Address without angle brackets
    pub email: String,
}

impl CcRecipient {
    /// Split a decoded Cc header into recipients.
    ///
    /// An empty header or the literal `none` yields no recipients. Segments
    /// are split on commas with no quoting support, so a comma inside a
    /// display name splits it. Each non-empty segment must be either
    /// `name <addr>` or a bare address; a bare segment is accepted when it
    /// contains `@` or is the only recipient in the header.
    pub fn parse_list(decoded: &str) -> Result<Vec<Self>> {
        let trimmed = decoded.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(Vec::new());
        }

        let segments: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        let lone = segments.len() == 1;

        segments
            .into_iter()
            .map(|segment| {
                Self::parse(segment, lone).ok_or_else(|| NormalizeError::AddressParsing {
                    header: "Cc".into(),
                    value: decoded.to_string(),
                })
            })
            .collect()
    }

    fn parse(segment: &str, lone: bool) -> Option<Self> {
        if segment.contains(['<', '>']) {
            let (name, email) = split_bracketed(segment)?;
            return Some(Self {
                raw: segment.to_string(),
                display_name: name.trim().to_string(),
                email: email.trim().to_string(),
            });
        }

        (lone || segment.contains('@')).then(|| Self {
            raw: segment.to_string(),
            display_name: String::new(),
            email: segment.to_string(),
        })
    }
}

/// Clean the first decoded segment of a To header.
#[must_use]
pub fn parse_to(first_segment: &str) -> String {
    first_segment
        .trim()
        .trim_matches(['<', '>'])
        .to_string()
}

/// Collapse CR, LF and TAB runs left over from header folding to one space.
#[must_use]
pub fn collapse_folding(value: &str) -> String {
    FOLDING.replace_all(value, " ").into_owned()
}

/// Split `name <addr>` at the last `<` that has a `>` after it. The address
/// runs to the last `>`.
fn split_bracketed(text: &str) -> Option<(&str, &str)> {
    let end = text.rfind('>')?;
    let start = text[..end].rfind('<')?;
    Some((&text[..start], &text[start + 1..end]))
}
