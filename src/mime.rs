//! MIME tree access
//!
//! The normalizer never parses bytes itself; it walks any tree exposing
//! [`MimePart`]. The implementation for [`mailparse::ParsedMail`] is the one
//! used by [`crate::parse_message`].

use crate::encoded_word::decode_base64_lenient;
use crate::error::{NormalizeError, Result};
use mailparse::ParsedMail;
use mailparse::body::Body;

/// A node of an already-parsed MIME tree
pub trait MimePart {
    /// Whether this node only groups other parts (`multipart/*`)
    fn is_multipart(&self) -> bool;

    /// Lower-cased `type/subtype`, `text/plain` when undeclared or invalid
    fn content_type(&self) -> String;

    /// `charset` parameter of the Content-Type header, if declared
    fn declared_charset(&self) -> Option<String>;

    /// Payload with the transfer encoding removed
    fn payload(&self) -> Result<Vec<u8>>;

    /// Best-effort payload for when [`Self::payload`] fails: undecodable
    /// input is skipped instead of rejected
    fn payload_lenient(&self) -> Vec<u8>;

    /// Filename parameter from Content-Disposition, else the Content-Type
    /// `name`, with any encoded words left undecoded
    fn filename(&self) -> Option<String>;

    /// Every header as `(name, raw value)`, in order, duplicates kept
    fn header_pairs(&self) -> Vec<(String, String)>;

    /// Child parts, in order
    fn subparts(&self) -> &[Self]
    where
        Self: Sized;

    /// First raw value of `name`, compared case-insensitively
    fn header(&self, name: &str) -> Option<String> {
        self.header_pairs()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Whether the part carries any header at all
    fn has_headers(&self) -> bool {
        !self.header_pairs().is_empty()
    }
}

impl MimePart for ParsedMail<'_> {
    fn is_multipart(&self) -> bool {
        self.ctype.mimetype.to_ascii_lowercase().starts_with("multipart/")
    }

    fn content_type(&self) -> String {
        let mimetype = self.ctype.mimetype.trim().to_ascii_lowercase();
        if mimetype.contains('/') {
            mimetype
        } else {
            "text/plain".to_string()
        }
    }

    fn declared_charset(&self) -> Option<String> {
        self.ctype
            .params
            .get("charset")
            .map(|charset| charset.trim().to_string())
            .filter(|charset| !charset.is_empty())
    }

    fn payload(&self) -> Result<Vec<u8>> {
        self.get_body_raw()
            .map_err(|e| NormalizeError::Payload(e.to_string()))
    }

    fn payload_lenient(&self) -> Vec<u8> {
        match self.get_body_encoded() {
            Body::Base64(body) => decode_base64_lenient(body.get_raw()),
            _ => self.get_body_raw().unwrap_or_default(),
        }
    }

    // Parameters come from the raw header text: mailparse's own values have
    // their encoded words decoded already.
    fn filename(&self) -> Option<String> {
        self.header("Content-Disposition")
            .and_then(|raw| mailparse::parse_content_disposition(&raw).params.remove("filename"))
            .or_else(|| {
                self.header("Content-Type")
                    .and_then(|raw| mailparse::parse_content_type(&raw).params.remove("name"))
            })
    }

    fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|h| (h.get_key(), header_text(h.get_value_raw())))
            .collect()
    }

    fn subparts(&self) -> &[Self] {
        &self.subparts
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|h| h.get_key().eq_ignore_ascii_case(name))
            .map(|h| header_text(h.get_value_raw()))
    }

    fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }
}

/// Convert raw header bytes to text and unfold continuation lines.
///
/// Tries UTF-8 first, then Windows-1252, which accepts every byte.
fn header_text(raw: &[u8]) -> String {
    let text = match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(raw);
            decoded.into_owned()
        }
    };
    text.chars().filter(|c| *c != '\r' && *c != '\n').collect()
}
