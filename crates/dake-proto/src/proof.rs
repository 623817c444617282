//! Ring-signature proof σ.
//!
//! Produced and verified by an external proof primitive; this crate only
//! moves the six 56-byte scalars on and off the wire as one blob.

use std::fmt;

use bytes::BufMut;

use crate::{codec, errors::Result};

/// Number of scalars in a proof
pub const PROOF_SCALARS: usize = 6;

/// Encoded proof size
pub const PROOF_BYTES: usize = PROOF_SCALARS * 56;

/// Opaque fixed-size proof.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RingProof([u8; PROOF_BYTES]);

impl RingProof {
    /// Wrap raw bytes.
    pub const fn from_bytes(bytes: [u8; PROOF_BYTES]) -> Self {
        Self(bytes)
    }

    /// All-zero placeholder.
    pub const fn zero() -> Self {
        Self([0u8; PROOF_BYTES])
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; PROOF_BYTES] {
        &self.0
    }

    /// Write the proof verbatim.
    pub fn serialize(&self, dst: &mut impl BufMut) -> usize {
        codec::serialize_bytes_array(dst, &self.0)
    }

    /// Read a proof, returning it and the bytes consumed.
    pub fn deserialize(src: &[u8]) -> Result<(Self, usize)> {
        let (bytes, nread) = codec::deserialize_bytes_array::<PROOF_BYTES>(src, "proof")?;
        Ok((Self(bytes), nread))
    }
}

impl Default for RingProof {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for RingProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RingProof(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_is_336_bytes() {
        let proof = RingProof::from_bytes([7; PROOF_BYTES]);
        let mut buf = Vec::new();
        assert_eq!(proof.serialize(&mut buf), 336);
        assert_eq!(RingProof::deserialize(&buf).unwrap(), (proof, 336));
        assert!(RingProof::deserialize(&buf[..335]).unwrap_err().is_truncation());
    }
}
