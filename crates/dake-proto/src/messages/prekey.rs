//! Prekey message: an offer published ahead of time for offline peers.

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
///
/// Same body as [`IdentityMessage`](super::IdentityMessage) under its own
/// type byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrekeyMessage {
    /// Sender's instance tag
    pub sender_tag: u32,
    /// Receiver's instance tag (0 when published)
    pub receiver_tag: u32,
    /// Publisher's profile
    pub profile: Profile,
    /// Publisher's ephemeral curve point
    pub y: EcPoint,
    /// Publisher's ephemeral finite-field value
    pub b: DhPublicKey,
}

impl PrekeyMessage {
    /// Wire type of this message.
    pub const MESSAGE_TYPE: MessageType = MessageType::Prekey;

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

    /// Release the profile and ephemeral values.
    pub fn destroy(&mut self) {
        self.profile.destroy();
        self.y = EcPoint::zero();
        self.b.clear();
    }

    /// Encode into a fresh buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(super::offer_len(&self.profile, &self.b));
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::IdentityMessage;

    #[test]
    fn identity_bytes_are_not_a_prekey() {
        let profile = Profile::from_parts([1; 32], "4", 5, [2; 64], Vec::new());
        let bytes = IdentityMessage::new(&profile).serialize().unwrap();
        assert!(PrekeyMessage::deserialize(&bytes).is_err());
    }

    #[test]
    fn round_trip_differs_from_identity_only_in_type() {
        let profile = Profile::from_parts([1; 32], "4", 5, [2; 64], Vec::new());
        let mut prekey = PrekeyMessage::new(&profile);
        prekey.sender_tag = 9;
        prekey.y = EcPoint::from_bytes([5; 56]);
        prekey.b = DhPublicKey::from_bytes_be(&[6, 7]);

        let mut identity = IdentityMessage::new(&profile);
        identity.sender_tag = 9;
        identity.y = prekey.y;
        identity.b = prekey.b.clone();

        let prekey_bytes = prekey.serialize().unwrap();
        let identity_bytes = identity.serialize().unwrap();
        assert_eq!(prekey_bytes[2], 0x0F);
        assert_eq!(prekey_bytes[3..], identity_bytes[3..]);
        assert_eq!(PrekeyMessage::deserialize(&prekey_bytes).unwrap(), prekey);
    }
}
