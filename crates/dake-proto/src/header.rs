//! Handshake message header with zero-copy parsing.
//!
//! Every DAKE message starts with the same 11 bytes:
//!
//! ```text
//! version(u16) | message_type(u8) | sender_tag(u32) | receiver_tag(u32)
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// Handshake message kinds and their wire type bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Interactive offer from the responder
    Identity,
    /// Responder's authentication
    AuthR,
    /// Initiator's authentication
    AuthI,
    /// Offline offer published for non-interactive handshakes
    Prekey,
    /// Non-interactive authentication with optional first payload
    NonInteractiveAuth,
}

impl MessageType {
    /// Wire byte for this kind.
    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Identity => 0x08,
            Self::AuthR => 0x91,
            Self::AuthI => 0x88,
            Self::Prekey => 0x0F,
            Self::NonInteractiveAuth => 0x8D,
        }
    }

    /// Kind for a wire byte. `None` if unrecognized.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x08 => Some(Self::Identity),
            0x91 => Some(Self::AuthR),
            0x88 => Some(Self::AuthI),
            0x0F => Some(Self::Prekey),
            0x8D => Some(Self::NonInteractiveAuth),
            _ => None,
        }
    }

    /// Short name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::AuthR => "auth-r",
            Self::AuthI => "auth-i",
            Self::Prekey => "prekey",
            Self::NonInteractiveAuth => "non-interactive-auth",
        }
    }
}

/// Fixed 11-byte message header (Big Endian network byte order)
///
/// # Security
///
/// The `#[repr(C, packed)]` layout with zerocopy traits lets the header be
/// cast directly from untrusted bytes; every 11-byte pattern is a valid
/// value. [`DakeHeader::from_bytes`] then rejects foreign protocol versions
/// and [`DakeHeader::expect_type`] rejects a header of the wrong kind before
/// any body byte is parsed.
#[repr(C, packed)]
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct DakeHeader {
    version: [u8; 2],
    message_type: u8,
    sender_tag: [u8; 4],
    receiver_tag: [u8; 4],
}

impl DakeHeader {
    /// Size of the serialized header
    pub const SIZE: usize = 11;

    /// Protocol version shared by every message
    pub const VERSION: u16 = 0x0004;

    /// Create a header for `message_type` between two instance tags.
    pub fn new(message_type: MessageType, sender_tag: u32, receiver_tag: u32) -> Self {
        Self {
            version: Self::VERSION.to_be_bytes(),
            message_type: message_type.to_u8(),
            sender_tag: sender_tag.to_be_bytes(),
            receiver_tag: receiver_tag.to_be_bytes(),
        }
    }

    /// Parse a header from the front of `bytes` (zero-copy).
    ///
    /// # Errors
    ///
    /// - `Truncated` if fewer than 11 bytes are available
    /// - `UnsupportedVersion` if the version is not [`DakeHeader::VERSION`]
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::Truncated {
                field: "header",
                expected: Self::SIZE,
                actual: bytes.len(),
            })?
            .0;

        if header.version() != Self::VERSION {
            return Err(ProtocolError::UnsupportedVersion(header.version()));
        }

        Ok(header)
    }

    /// Fail unless this header carries `expected`.
    pub fn expect_type(&self, expected: MessageType) -> Result<()> {
        if self.message_type != expected.to_u8() {
            return Err(ProtocolError::UnexpectedMessageType {
                expected: expected.to_u8(),
                actual: self.message_type,
            });
        }
        Ok(())
    }

    /// Serialize header to bytes (zero-copy)
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(IntoBytes::as_bytes(self));
        out
    }

    /// Protocol version.
    pub fn version(&self) -> u16 {
        u16::from_be_bytes(self.version)
    }

    /// Raw message type byte.
    pub fn message_type(&self) -> u8 {
        self.message_type
    }

    /// Message type as enum. `None` if unrecognized.
    pub fn message_type_enum(&self) -> Option<MessageType> {
        MessageType::from_u8(self.message_type)
    }

    /// Sender's instance tag.
    pub fn sender_tag(&self) -> u32 {
        u32::from_be_bytes(self.sender_tag)
    }

    /// Receiver's instance tag.
    pub fn receiver_tag(&self) -> u32 {
        u32::from_be_bytes(self.receiver_tag)
    }
}

impl std::fmt::Debug for DakeHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DakeHeader")
            .field("version", &self.version())
            .field("message_type", &format_args!("{:#04x}", self.message_type))
            .field("sender_tag", &self.sender_tag())
            .field("receiver_tag", &self.receiver_tag())
            .finish()
    }
}
