//! RFC 2047 encoded-word decoding for header values, plus the lenient
//! base64 decoder shared with broken message bodies

use crate::charset::{self, Decoded};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use std::sync::LazyLock;

static ENCODED_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\?([^?\s]+)\?([bBqQ])\?([^?\s]*)\?=").unwrap());

// Mail clients regularly emit unpadded or over-padded B words.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A run of header text: either literal, or the raw bytes of one or more
/// adjacent encoded words sharing a charset
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Plain(String),
    Encoded { charset: String, bytes: Vec<u8> },
}

impl Segment {
    fn decode(&self, fallback: &str) -> Decoded {
        match self {
            Self::Plain(text) => Decoded::new(text.clone(), false),
            Self::Encoded { charset: label, bytes } => {
                charset::decode(bytes, Some(label.as_str()), fallback)
            }
        }
    }
}

/// Decode every encoded word in a header value and concatenate the result.
///
/// Each word is decoded with its own declared charset, resolved against
/// `fallback`. Whitespace separating two encoded words is dropped. A word
/// whose payload cannot be decoded is kept literally.
#[must_use]
pub fn decode_header(value: &str, fallback: &str) -> Decoded {
    let mut out = Decoded::default();
    for segment in segments(value) {
        let decoded = segment.decode(fallback);
        out.text.push_str(&decoded.text);
        out.lossy |= decoded.lossy;
    }
    out
}

/// Decode only the first segment of a header value.
///
/// A segment is either a run of literal text or a run of adjacent encoded
/// words in the same charset; everything after it is discarded.
#[must_use]
pub fn decode_first_segment(value: &str, fallback: &str) -> Decoded {
    segments(value)
        .first()
        .map(|segment| segment.decode(fallback))
        .unwrap_or_default()
}

fn segments(value: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut last_end = 0;

    for caps in ENCODED_WORD.captures_iter(value) {
        let Some(word) = caps.get(0) else {
            continue;
        };

        let between = &value[last_end..word.start()];
        let follows_encoded = matches!(out.last(), Some(Segment::Encoded { .. }));
        if !(follows_encoded && between.trim().is_empty()) {
            push_plain(&mut out, between);
        }
        last_end = word.end();

        // RFC 2231 allows a language suffix: "utf-8*en"
        let charset = caps[1]
            .split_once('*')
            .map_or(&caps[1], |(name, _)| name)
            .to_ascii_lowercase();

        match decode_payload(&caps[2], &caps[3]) {
            Some(bytes) => push_encoded(&mut out, charset, bytes),
            None => push_plain(&mut out, word.as_str()),
        }
    }

    push_plain(&mut out, &value[last_end..]);
    out
}

fn push_plain(out: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Plain(last)) = out.last_mut() {
        last.push_str(text);
    } else {
        out.push(Segment::Plain(text.to_string()));
    }
}

fn push_encoded(out: &mut Vec<Segment>, charset: String, bytes: Vec<u8>) {
    // Multi-byte characters may be split across adjacent words, so bytes
    // are joined before charset decoding.
    if let Some(Segment::Encoded {
        charset: last_charset,
        bytes: last_bytes,
    }) = out.last_mut()
        && *last_charset == charset
    {
        last_bytes.extend_from_slice(&bytes);
        return;
    }
    out.push(Segment::Encoded { charset, bytes });
}

fn decode_payload(encoding: &str, text: &str) -> Option<Vec<u8>> {
    if encoding.eq_ignore_ascii_case("b") {
        LENIENT_BASE64.decode(text).ok()
    } else {
        Some(decode_q(text))
    }
}

/// Decode base64 the way lax mail readers do: bytes outside the alphabet
/// are dropped and a dangling final character is ignored.
pub fn decode_base64_lenient(raw: &[u8]) -> Vec<u8> {
    let mut clean: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
        .collect();
    if clean.len() % 4 == 1 {
        clean.pop();
    }
    LENIENT_BASE64.decode(&clean).unwrap_or_default()
}

fn decode_q(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'_' => out.push(b' '),
            b'=' => {
                let escaped = bytes
                    .get(i + 1..i + 3)
                    .and_then(|hex| Some((hex_value(hex[0])? << 4) | hex_value(hex[1])?));
                if let Some(byte) = escaped {
                    out.push(byte);
                    i += 3;
                    continue;
                }
                out.push(b'=');
            }
            other => out.push(other),
        }
        i += 1;
    }

    out
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
