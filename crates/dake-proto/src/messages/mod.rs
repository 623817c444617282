//! Handshake messages.
//!
//! Five kinds share the 11-byte [`DakeHeader`] and differ in body:
//!
//! | Kind                   | Type | Body                                   |
//! |------------------------|------|----------------------------------------|
//! | Identity               | 0x08 | profile, Y, B                          |
//! | Auth-R                 | 0x91 | profile, X, A, sigma                   |
//! | Auth-I                 | 0x88 | sigma                                  |
//! | Prekey                 | 0x0F | profile, Y, B                          |
//! | Non-Interactive-Auth   | 0x8D | profile, X, A, sigma, [payload], tag   |
//!
//! # Invariants
//!
//! - Round-trip: decoding an encoded message yields an equal message
//! - Header gate: each kind's `deserialize` checks version and type before
//!   touching the body
//! - All-or-nothing: a decode either returns a complete message or an error;
//!   partial results are never exposed
//!
//! Curve and group membership of the ephemerals is NOT checked here; that is
//! the job of [`crate::validation`].

mod auth_i;
mod auth_r;
mod identity;
mod non_interactive;
mod prekey;

pub use auth_i::AuthIMessage;
pub use auth_r::AuthRMessage;
pub use identity::IdentityMessage;
pub use non_interactive::{AUTH_TAG_BYTES, EncryptedPayload, NONCE_BYTES, NonInteractiveAuthMessage};
pub use prekey::PrekeyMessage;

use bytes::BufMut;
use dake_crypto::DhPublicKey;

use crate::{
    codec::{LEN_PREFIX_BYTES, Reader},
    errors::{ProtocolError, Result},
    header::{DakeHeader, MessageType},
    profile::Profile,
};

/// Any handshake message, dispatched on the header's type byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DakeMessage {
    /// Identity message
    Identity(IdentityMessage),
    /// Auth-R message
    AuthR(AuthRMessage),
    /// Auth-I message
    AuthI(AuthIMessage),
    /// Prekey message
    Prekey(PrekeyMessage),
    /// Non-Interactive-Auth message
    NonInteractiveAuth(NonInteractiveAuthMessage),
}

impl DakeMessage {
    /// Kind of this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Identity(_) => MessageType::Identity,
            Self::AuthR(_) => MessageType::AuthR,
            Self::AuthI(_) => MessageType::AuthI,
            Self::Prekey(_) => MessageType::Prekey,
            Self::NonInteractiveAuth(_) => MessageType::NonInteractiveAuth,
        }
    }

    /// Sender's instance tag.
    pub fn sender_tag(&self) -> u32 {
        match self {
            Self::Identity(m) => m.sender_tag,
            Self::AuthR(m) => m.sender_tag,
            Self::AuthI(m) => m.sender_tag,
            Self::Prekey(m) => m.sender_tag,
            Self::NonInteractiveAuth(m) => m.sender_tag,
        }
    }

    /// Receiver's instance tag.
    pub fn receiver_tag(&self) -> u32 {
        match self {
            Self::Identity(m) => m.receiver_tag,
            Self::AuthR(m) => m.receiver_tag,
            Self::AuthI(m) => m.receiver_tag,
            Self::Prekey(m) => m.receiver_tag,
            Self::NonInteractiveAuth(m) => m.receiver_tag,
        }
    }

    /// Embedded profile, if the kind carries one.
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::Identity(m) => Some(&m.profile),
            Self::AuthR(m) => Some(&m.profile),
            Self::AuthI(_) => None,
            Self::Prekey(m) => Some(&m.profile),
            Self::NonInteractiveAuth(m) => Some(&m.profile),
        }
    }

    /// Encode into a fresh buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        match self {
            Self::Identity(m) => m.serialize(),
            Self::AuthR(m) => m.serialize(),
            Self::AuthI(m) => m.serialize(),
            Self::Prekey(m) => m.serialize(),
            Self::NonInteractiveAuth(m) => m.serialize(),
        }
    }

    /// Decode any handshake message.
    ///
    /// # Errors
    ///
    /// - `UnknownMessageType` if the type byte names no handshake message
    /// - any error of the matching kind's `deserialize`
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = DakeHeader::from_bytes(bytes)?;
        let Some(kind) = header.message_type_enum() else {
            tracing::debug!(message_type = header.message_type(), "unknown handshake message");
            return Err(ProtocolError::UnknownMessageType(header.message_type()));
        };

        Ok(match kind {
            MessageType::Identity => Self::Identity(IdentityMessage::deserialize(bytes)?),
            MessageType::AuthR => Self::AuthR(AuthRMessage::deserialize(bytes)?),
            MessageType::AuthI => Self::AuthI(AuthIMessage::deserialize(bytes)?),
            MessageType::Prekey => Self::Prekey(PrekeyMessage::deserialize(bytes)?),
            MessageType::NonInteractiveAuth => {
                Self::NonInteractiveAuth(NonInteractiveAuthMessage::deserialize(bytes)?)
            },
        })
    }
}

fn write_header(
    dst: &mut impl BufMut,
    kind: MessageType,
    sender_tag: u32,
    receiver_tag: u32,
) -> usize {
    dst.put_slice(&DakeHeader::new(kind, sender_tag, receiver_tag).to_bytes());
    DakeHeader::SIZE
}

/// Check the header for `expected` and return `(sender_tag, receiver_tag)`.
fn read_header(reader: &mut Reader<'_>, expected: MessageType) -> Result<(u32, u32)> {
    reader.step(|src| {
        let header = DakeHeader::from_bytes(src)?;
        header.expect_type(expected)?;
        Ok(((header.sender_tag(), header.receiver_tag()), DakeHeader::SIZE))
    })
}

fn decode_logged<T>(kind: MessageType, decode: impl FnOnce() -> Result<T>) -> Result<T> {
    decode().inspect_err(|e| tracing::debug!(kind = kind.name(), error = %e, "decode failed"))
}

/// Encoded length of an Identity or Prekey message.
fn offer_len(profile: &Profile, b: &DhPublicKey) -> usize {
    DakeHeader::SIZE
        + profile.serialized_len()
        + dake_crypto::EC_POINT_BYTES
        + LEN_PREFIX_BYTES
        + b.as_bytes_be().len()
}
