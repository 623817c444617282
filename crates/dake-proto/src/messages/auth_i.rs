//! Auth-I message: the responder's final proof.

use bytes::BufMut;

use super::{decode_logged, read_header, write_header};
use crate::{codec::Reader, errors::Result, header::MessageType, proof::RingProof};

/// `header | sigma[336]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthIMessage {
    /// Sender's instance tag
    pub sender_tag: u32,
    /// Receiver's instance tag
    pub receiver_tag: u32,
    /// Ring-signature proof
    pub sigma: RingProof,
}

impl AuthIMessage {
    /// Wire type of this message.
    pub const MESSAGE_TYPE: MessageType = MessageType::AuthI;

    /// Encoded size; Auth-I is fixed length.
    pub const SIZE: usize = crate::header::DakeHeader::SIZE + crate::proof::PROOF_BYTES;

    /// New empty message. Auth-I carries no profile.
    pub fn new() -> Self {
        Self { sender_tag: 0, receiver_tag: 0, sigma: RingProof::zero() }
    }

    /// Zero the proof.
    pub fn destroy(&mut self) {
        self.sigma = RingProof::zero();
    }

    /// Encode into a fresh buffer.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        self.encode(&mut buf)?;
        Ok(buf)
    }

    /// Encode into `dst`, returning bytes written.
    pub fn encode(&self, dst: &mut impl BufMut) -> Result<usize> {
        let written = write_header(dst, Self::MESSAGE_TYPE, self.sender_tag, self.receiver_tag)
            + self.sigma.serialize(dst);
        debug_assert_eq!(written, Self::SIZE);
        Ok(written)
    }

    /// Decode from wire bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        decode_logged(Self::MESSAGE_TYPE, || {
            let mut reader = Reader::new(bytes);
            let (sender_tag, receiver_tag) = read_header(&mut reader, Self::MESSAGE_TYPE)?;
            let sigma = reader.step(RingProof::deserialize)?;

            reader.finish()?;
            Ok(Self { sender_tag, receiver_tag, sigma })
        })
    }
}

impl Default for AuthIMessage {
    fn default() -> Self {
        Self::new()
    }
}
