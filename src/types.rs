//! Core types for normalized messages

use crate::address::CcRecipient;
use crate::error::{NormalizeError, Result};
use crate::extracted::TextPart;
use crate::headers::HeaderMap;
use crate::session::MailSession;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Identity of a fetched message, owned by the mail session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageIdentity {
    /// IMAP UID
    pub uid: u32,

    /// Folder the message was fetched from
    pub folder: String,

    /// IMAP flags at fetch time
    pub flags: Vec<String>,
}

impl MessageIdentity {
    pub fn new(uid: u32, folder: impl Into<String>) -> Self {
        Self {
            uid,
            folder: folder.into(),
            flags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_flags<S: AsRef<str>>(mut self, flags: &[S]) -> Self {
        self.flags = flags.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }
}

/// A message normalized into decoded, queryable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedMessage {
    /// IMAP UID, carried from the session
    pub uid: u32,

    /// Owning folder, carried from the session
    pub folder: String,

    /// IMAP flags, deduplicated; changed only through [`Self::mark`]
    pub flags: Vec<String>,

    /// Decoded subject, empty if absent
    pub subject: String,

    /// Decoded From text
    pub from: String,

    /// Sender display name, empty for bare addresses
    pub from_whom: String,

    /// Sender address
    pub from_email: String,

    /// First decoded segment of To, angle brackets stripped
    pub to: String,

    /// Cc recipients in header order
    pub cc: Vec<CcRecipient>,

    /// Date header, unparsed
    pub date: Option<String>,

    /// Every header with its raw values
    pub headers: HeaderMap,

    /// `text/plain` parts in traversal order
    pub text: Vec<TextPart>,

    /// Decoded `text/html` parts in traversal order
    pub html: Vec<String>,

    /// Every other leaf part
    pub attachments: Vec<Attachment>,

    /// Set when any decode replaced invalid byte sequences
    pub lossy: bool,

    #[serde(skip)]
    session: Option<Arc<dyn MailSession>>,
}

/// A non-text leaf part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Decoded filename, empty if the part names none
    pub filename: String,

    /// Payload, `None` when its transfer encoding could not be decoded
    pub data: Option<Vec<u8>>,

    /// Lower-cased `type/subtype`
    pub content_type: String,
}

impl NormalizedMessage {
    /// Empty record for `identity`, flags deduplicated, no session attached
    #[must_use]
    pub fn new(identity: MessageIdentity) -> Self {
        let mut message = Self {
            uid: identity.uid,
            folder: identity.folder,
            ..Self::default()
        };
        for flag in identity.flags {
            if !message.has_flag(&flag) {
                message.flags.push(flag);
            }
        }
        message
    }

    /// Attach the session that mutation calls are forwarded to
    pub fn attach(&mut self, session: Arc<dyn MailSession>) {
        self.session = Some(session);
    }

    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn MailSession>) -> Self {
        self.attach(session);
        self
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Update local flags, then forward `flags` to the session unchanged.
    ///
    /// A flag already present is not added twice. `un<flag>` removes
    /// `<flag>` if present. Flags are updated even when no session is
    /// attached, in which case [`NormalizeError::Detached`] is returned.
    pub fn mark<S: AsRef<str>>(&mut self, flags: &[S]) -> Result<()> {
        let flags: Vec<String> = flags.iter().map(|f| f.as_ref().to_string()).collect();
        for flag in &flags {
            self.apply_flag(flag);
        }
        self.session()?.mark(&flags, self.uid)
    }

    pub fn delete(&self) -> Result<()> {
        self.session()?.delete_message(self.uid, &self.folder)
    }

    pub fn copy_to(&self, folder: &str) -> Result<()> {
        self.session()?.copy_message(self.uid, folder, self)
    }

    pub fn move_to(&self, folder: &str) -> Result<()> {
        self.session()?.move_message(self.uid, folder, self)
    }

    /// Parse the Date header as RFC 2822
    #[must_use]
    pub fn parsed_date(&self) -> Option<DateTime<FixedOffset>> {
        self.date
            .as_deref()
            .and_then(|date| DateTime::parse_from_rfc2822(date.trim()).ok())
    }

    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    fn apply_flag(&mut self, flag: &str) {
        if let Some(bare) = flag.strip_prefix("un") {
            self.flags.retain(|f| f != bare);
        } else if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
    }

    fn session(&self) -> Result<&Arc<dyn MailSession>> {
        self.session.as_ref().ok_or(NormalizeError::Detached)
    }
}
