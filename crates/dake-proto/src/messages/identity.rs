//! Identity message: the responder's interactive offer.

use bytes::BufMut;
use dake_crypto::{DhPublicKey, EcPoint};

use super::{decode_logged, read_header, write_header};
use crate::{
    codec::{self, Reader},
    errors::Result,
    header::MessageType,
    profile::Profile,
};

/// `header | profile | Y[56] | B: MPI`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMessage {
    /// Sender's instance tag
    pub sender_tag: u32,
    /// Receiver's instance tag (0 when unknown)
    pub receiver_tag: u32,
    /// Sender's profile
    pub profile: Profile,
    /// Sender's ephemeral curve point
    pub y: EcPoint,
    /// Sender's ephemeral finite-field value
    pub b: DhPublicKey,
}

impl IdentityMessage {
    /// Wire type of this message.
    pub const MESSAGE_TYPE: MessageType = MessageType::Identity;

    /// New message carrying a copy of `profile`, with zero tags and
    /// ephemerals.
    pub fn new(profile: &Profile) -> Self {
        Self {
            sender_tag: 0,
            receiver_tag: 0,
            profile: profile.clone(),
            y: EcPoint::zero(),
            b: DhPublicKey::default(),
        }
    }

    /// Release the profile and ephemeral values, leaving an empty message.
    pub fn destroy(&mut self) {
        self.profile.destroy();
        self.y = EcPoint::zero();
        self.b.clear();
    }

    /// Encode into a fresh buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.serialized_len());
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Encode into `dst`, returning bytes written.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<usize> {
        let mut written = write_header(dst, Self::MESSAGE_TYPE, self.sender_tag, self.receiver_tag);
        written += self.profile.serialize(dst)?;
        written += codec::serialize_ec_point(dst, &self.y);
        written += codec::serialize_dh_public_key(dst, &self.b)?;
        Ok(written)
    }

    /// Decode from wire bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        decode_logged(Self::MESSAGE_TYPE, || {
            let mut reader = Reader::new(bytes);
            let (sender_tag, receiver_tag) = read_header(&mut reader, Self::MESSAGE_TYPE)?;
            let profile = reader.step(Profile::deserialize)?;
            let y = reader.ec_point()?;
            let b = reader.dh_public_key()?;

            reader.finish()?;
            Ok(Self { sender_tag, receiver_tag, profile, y, b })
        })
    }

    fn serialized_len(&self) -> usize {
        super::offer_len(&self.profile, &self.b)
    }
}
