//! Charset resolution with a safe fallback
//!
//! Every decode goes through [`resolve`], which consults the `encoding_rs`
//! label registry and falls back when a label is absent or unknown. Invalid
//! byte sequences are replaced with U+FFFD, so decoding never fails; the
//! returned [`Decoded`] records whether anything was replaced.

use encoding_rs::{Encoding, REPLACEMENT, UTF_8};
use regex::bytes::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Charset used when none is declared or the declared one is unknown
pub const DEFAULT_FALLBACK: &str = "utf-8";

// bs4-style scan windows: XML declarations must sit at the very start,
// meta tags are searched a little further into the document.
const XML_SEARCH_LEN: usize = 1024;
const HTML_SEARCH_LEN: usize = 2048;

static XML_ENCODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?-u)\A\s*<\?[^>]*?encoding\s*=\s*['"]([^'"]*)['"]"#).unwrap()
});

static HTML_META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<\s*meta[^>]+charset\s*=\s*["']?([^>]*?)[ /;'">]"#).unwrap()
});

/// Text produced by a best-effort decode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded text, always valid
    pub text: String,

    /// Whether invalid byte sequences were replaced
    pub lossy: bool,
}

impl Decoded {
    #[must_use]
    pub const fn new(text: String, lossy: bool) -> Self {
        Self { text, lossy }
    }
}

/// Pick a usable encoding for `declared`, or for `fallback` if `declared` is
/// absent or unknown. An unknown fallback resolves to UTF-8.
#[must_use]
pub fn resolve(declared: Option<&str>, fallback: &str) -> &'static Encoding {
    if let Some(encoding) = declared.and_then(lookup) {
        return encoding;
    }
    if let Some(label) = declared {
        debug!(charset = label, fallback, "Unrecognized charset, using fallback");
    }
    lookup(fallback).unwrap_or(UTF_8)
}

fn lookup(label: &str) -> Option<&'static Encoding> {
    let label = label.trim().trim_matches('"');
    if label.is_empty() {
        return None;
    }
    // The replacement encoding maps whole inputs to a single U+FFFD, which
    // is worse than decoding with the fallback.
    Encoding::for_label(label.as_bytes()).filter(|encoding| *encoding != REPLACEMENT)
}

/// Decode `bytes` with the resolved charset, replacing invalid sequences.
#[must_use]
pub fn decode(bytes: &[u8], declared: Option<&str>, fallback: &str) -> Decoded {
    let encoding = resolve(declared, fallback);
    let (text, lossy) = encoding.decode_without_bom_handling(bytes);
    if lossy {
        debug!(encoding = encoding.name(), "Replaced invalid byte sequences");
    }
    Decoded::new(text.into_owned(), lossy)
}

/// Find a charset declared inside HTML or XML markup.
///
/// Looks for an XML declaration at the start of the document, then for a
/// `<meta charset=...>` or `<meta http-equiv ... content="...; charset=...">`
/// tag. Returns the lower-cased label as written, recognized or not.
#[must_use]
pub fn declared_html_charset(markup: &[u8]) -> Option<String> {
    let xml_end = markup.len().min(XML_SEARCH_LEN);
    let html_end = markup.len().min(HTML_SEARCH_LEN.max(markup.len() / 20));

    XML_ENCODING
        .captures(&markup[..xml_end])
        .or_else(|| HTML_META_CHARSET.captures(&markup[..html_end]))
        .and_then(|caps| caps.get(1))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).trim().to_ascii_lowercase())
        .filter(|label| !label.is_empty())
}
