//! Auth-R message: the initiator's reply to an Identity message.

use bytes::BufMut;
use dake_crypto::{DhPublicKey, EcPoint};

use super::{decode_logged, read_header, write_header};
use crate::{
    codec::{self, Reader},
    errors::Result,
    header::MessageType,
    profile::Profile,
    proof::RingProof,
};

/// `header | profile | X[56] | A: MPI | sigma[336]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRMessage {
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
}

impl AuthRMessage {
    /// Wire type of this message.
    pub const MESSAGE_TYPE: MessageType = MessageType::AuthR;

    /// New message carrying a copy of `profile`; everything else zero.
    pub fn new(profile: &Profile) -> Self {
        Self {
            sender_tag: 0,
            receiver_tag: 0,
            profile: profile.clone(),
            x: EcPoint::zero(),
            a: DhPublicKey::default(),
            sigma: RingProof::zero(),
        }
    }

    /// Release the profile, ephemeral values and proof.
    pub fn destroy(&mut self) {
        self.profile.destroy();
        self.x = EcPoint::zero();
        self.a.clear();
        self.sigma = RingProof::zero();
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

            reader.finish()?;
            Ok(Self { sender_tag, receiver_tag, profile, x, a, sigma })
        })
    }
}
