//! Error types for the Logos wire protocol.

use thiserror::Error;

/// Errors that can occur while encoding or decoding protocol frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON, not an envelope, or its payload does not
    /// match the variant it names.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// The envelope names more than one recognized variant.
    #[error("ambiguous envelope: {}", .0.join(", "))]
    Ambiguous(Vec<String>),

    /// Serializing an outbound command failed.
    #[error("encoding failed: {0}")]
    Encode(String),
}
