//! Error types for message normalization

use thiserror::Error;

/// Errors that can occur while normalizing a message
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// A Cc recipient matched neither the bare nor the `name <addr>` grammar
    #[error("Error parsing {header} message header. Header value: {value}")]
    AddressParsing { header: String, value: String },

    /// The raw bytes could not be parsed into a MIME tree
    #[error("Failed to parse email structure: {0}")]
    Structure(String),

    /// Transfer decoding of a part payload failed
    #[error("Failed to decode payload: {0}")]
    Payload(String),

    /// The mail session rejected a forwarded call
    #[error("Mail session error: {0}")]
    Session(String),

    /// A mutation was requested on a record with no session attached
    #[error("Message is not attached to a mail session")]
    Detached,
}

/// Result type for normalization operations
pub type Result<T> = std::result::Result<T, NormalizeError>;
