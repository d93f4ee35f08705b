//! Mail session capability used by record mutation methods

use crate::error::Result;
use crate::types::NormalizedMessage;
use std::fmt;

/// Operations a mail session (typically an IMAP connection) performs on
/// behalf of a [`NormalizedMessage`].
///
/// Calls are forwarded verbatim; results are returned to the caller
/// without interpretation. Implementations synchronize themselves.
pub trait MailSession: fmt::Debug + Send + Sync {
    /// Store `flags` on message `uid`. Entries prefixed with `un` clear the
    /// flag they name.
    fn mark(&self, flags: &[String], uid: u32) -> Result<()>;

    fn delete_message(&self, uid: u32, folder: &str) -> Result<()>;

    fn copy_message(&self, uid: u32, target_folder: &str, message: &NormalizedMessage)
    -> Result<()>;

    fn move_message(&self, uid: u32, target_folder: &str, message: &NormalizedMessage)
    -> Result<()>;
}
