// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Email Message Normalizer
//!
//! Turns an already-parsed MIME tree into a [`NormalizedMessage`]: decoded
//! subject and addressing fields, plain-text and HTML bodies, attachments and
//! a case-insensitive header map. Malformed or mixed-encoding input degrades
//! to a best-effort record instead of failing.
//!
//! # Features
//!
//! - Depth-first multipart walking
//! - Charset resolution with a UTF-8 fallback and replacement of bad bytes
//! - RFC 2047 encoded-word decoding for headers and filenames
//! - From / To / Cc splitting into display names and addresses
//! - Link extraction and whitespace normalization for plain text
//! - Flag, delete, copy and move calls forwarded to a [`MailSession`]
//!
//! # Example
//!
//! ```rust
//! use email_normalize::{MessageIdentity, parse_message};
//!
//! let raw = b"From: John Doe <john@example.com>\r\nSubject: Hello\r\n\r\nSee https://example.com";
//! let msg = parse_message(MessageIdentity::new(1, "INBOX"), raw).unwrap();
//!
//! assert_eq!(msg.from_whom, "John Doe");
//! assert_eq!(msg.from_email, "john@example.com");
//! assert!(msg.text[0].links.contains("https://example.com"));
//! ```

mod address;
mod charset;
mod encoded_word;
mod error;
mod extracted;
mod headers;
mod mime;
mod options;
mod parser;
mod session;
mod types;

pub use address::{CcRecipient, FromAddress, collapse_folding, parse_to};
pub use charset::{DEFAULT_FALLBACK, Decoded, declared_html_charset, decode, resolve};
pub use encoded_word::{decode_first_segment, decode_header};
pub use error::{NormalizeError, Result};
pub use extracted::{TextPart, extract_links, normalize_whitespace};
pub use headers::{HeaderEntry, HeaderMap};
pub use mime::MimePart;
pub use options::NormalizerOptions;
pub use parser::{normalize, parse_message, parse_message_with};
pub use session::MailSession;
pub use types::{Attachment, MessageIdentity, NormalizedMessage};
