//! Error types for wire encoding and decoding.
//!
//! Every decode failure is a [`ProtocolError`]: the caller discards the
//! buffer and never sees a partially populated message. Failures of the
//! received-value gate are a separate type,
//! [`ValidationFailure`](crate::validation::ValidationFailure), so a
//! security rejection is never mistaken for a corrupt buffer.

use thiserror::Error;

/// Errors from encoding or decoding handshake messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer bytes remain than a field requires
    #[error("truncated {field}: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Field being read
        field: &'static str,
        /// Bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Header carries a protocol version other than ours
    #[error("unsupported protocol version: {0:#06x}")]
    UnsupportedVersion(u16),

    /// Header carries a different message type than the one being parsed
    #[error("unexpected message type: expected {expected:#04x}, got {actual:#04x}")]
    UnexpectedMessageType {
        /// Type of the message being parsed
        expected: u8,
        /// Type found in the header
        actual: u8,
    },

    /// Header carries a message type outside the handshake
    #[error("unknown message type: {0:#04x}")]
    UnknownMessageType(u8),

    /// Profile identity key has an unrecognized key type
    #[error("invalid identity key type: {0:#06x}")]
    InvalidKeyType(u16),

    /// A value is too large for its wire encoding
    #[error("{field} too large: {size} bytes (max {max})")]
    ValueTooLarge {
        /// Field being written or read
        field: &'static str,
        /// Actual size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Profile version string is not valid UTF-8
    #[error("profile versions are not valid UTF-8")]
    InvalidVersions,

    /// Bytes remain after a complete message
    #[error("{count} trailing bytes after message")]
    TrailingBytes {
        /// Number of unread bytes
        count: usize,
    },
}

impl ProtocolError {
    /// Returns true if more input could have made the decode succeed.
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// Convenience alias for protocol results
pub type Result<T> = std::result::Result<T, ProtocolError>;
