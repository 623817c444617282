//! Non-Interactive-Auth message: the initiator's reply to a Prekey message,
//! optionally carrying the first encrypted payload.
//!
//! ```text
//! header | profile | X[56] | A: MPI | sigma[336]
//!        | [ciphertext: DATA | nonce[24]]      (optional)
//!        | auth_tag[64]
//! ```
//!
//! The payload block is present exactly when more than an auth tag's worth
//! of bytes follows the proof.

use bytes::BufMut;
use dake_crypto::{DhPublicKey, EcPoint};
use zeroize::Zeroize;

use super::{decode_logged, read_header, write_header};
use crate::{
    codec::{self, Reader},
    errors::Result,
    header::MessageType,
    profile::Profile,
    proof::RingProof,
};

/// Size of the trailing authentication tag
pub const AUTH_TAG_BYTES: usize = 64;

/// Size of the payload nonce
pub const NONCE_BYTES: usize = 24;

/// First data message sent alongside the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedPayload {
    /// Encrypted bytes
    pub ciphertext: Vec<u8>,
    /// Encryption nonce
    pub nonce: [u8; NONCE_BYTES],
}

impl EncryptedPayload {
    fn encode(&self, dst: &mut impl BufMut) -> Result<usize> {
        Ok(codec::serialize_data(dst, &self.ciphertext)?
            + codec::serialize_bytes_array(dst, &self.nonce))
    }

    fn decode(src: &[u8]) -> Result<(Self, usize)> {
        let mut reader = Reader::new(src);
        let ciphertext = reader.data()?;
        let nonce = reader.array::<NONCE_BYTES>("nonce")?;
        Ok((Self { ciphertext, nonce }, reader.position()))
    }
}

impl Zeroize for EncryptedPayload {
    fn zeroize(&mut self) {
        self.ciphertext.zeroize();
        self.nonce.zeroize();
    }
}

/// Non-interactive authentication message.
///
/// The payload is owned by the message. Serialization borrows it and never
/// consumes it; it is released with the message or by
/// [`NonInteractiveAuthMessage::destroy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonInteractiveAuthMessage {
    /// Sender's instance tag
    pub sender_tag: u32,
    /// Receiver's instance tag
    pub receiver_tag: u32,
    /// Sender's profile
    pub profile: Profile,
    /// Sender's ephemeral curve point
    pub x: EcPoint,
    /// Sender's ephemeral finite-field value
    pub a: DhPublicKey,
    /// Ring-signature proof
    pub sigma: RingProof,
    /// Optional first payload
    pub payload: Option<EncryptedPayload>,
    /// Authentication tag over the message
    pub auth_tag: [u8; AUTH_TAG_BYTES],
}

impl NonInteractiveAuthMessage {
    /// Wire type of this message.
    pub const MESSAGE_TYPE: MessageType = MessageType::NonInteractiveAuth;

    /// New message carrying a copy of `profile`; no payload, everything else
    /// zero.
    pub fn new(profile: &Profile) -> Self {
        Self {
            sender_tag: 0,
            receiver_tag: 0,
            profile: profile.clone(),
            x: EcPoint::zero(),
            a: DhPublicKey::default(),
            sigma: RingProof::zero(),
            payload: None,
            auth_tag: [0u8; AUTH_TAG_BYTES],
        }
    }

    /// Release the profile, ephemerals, proof and payload.
    pub fn destroy(&mut self) {
        self.profile.destroy();
        self.x = EcPoint::zero();
        self.a.clear();
        self.sigma = RingProof::zero();
        if let Some(mut payload) = self.payload.take() {
            payload.zeroize();
        }
        self.auth_tag.zeroize();
    }

    /// Encode into a fresh buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Encode into `dst`, returning bytes written.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<usize> {
        let mut written = write_header(dst, Self::MESSAGE_TYPE, self.sender_tag, self.receiver_tag);
        written += self.profile.serialize(dst)?;
        written += codec::serialize_ec_point(dst, &self.x);
        written += codec::serialize_dh_public_key(dst, &self.a)?;
        written += self.sigma.serialize(dst);
        if let Some(payload) = &self.payload {
            written += payload.encode(dst)?;
        }
        written += codec::serialize_bytes_array(dst, &self.auth_tag);
        Ok(written)
    }

    /// Decode from wire bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        decode_logged(Self::MESSAGE_TYPE, || {
            let mut reader = Reader::new(bytes);
            let (sender_tag, receiver_tag) = read_header(&mut reader, Self::MESSAGE_TYPE)?;
            let profile = reader.step(Profile::deserialize)?;
            let x = reader.ec_point()?;
            let a = reader.dh_public_key()?;
            let sigma = reader.step(RingProof::deserialize)?;

            let payload = if reader.remaining_len() > AUTH_TAG_BYTES {
                Some(reader.step(EncryptedPayload::decode)?)
            } else {
                None
            };
            let auth_tag = reader.array::<AUTH_TAG_BYTES>("auth tag")?;

            reader.finish()?;
            Ok(Self { sender_tag, receiver_tag, profile, x, a, sigma, payload, auth_tag })
        })
    }
}
