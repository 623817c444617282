//! Signed identity profiles.
//!
//! A profile binds a long-term Ed25519 identity key to the protocol versions
//! its owner supports and an expiry time. Wire layout:
//!
//! ```text
//! key_type(u16 = 0x0020) | identity_key[32]
//! versions: DATA
//! expires: u64                     (seconds since the Unix epoch)
//! signature[64]                    (over everything above)
//! transitional_signature: DATA     (legacy bridge, empty when absent)
//! ```

use bytes::BufMut;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroize;

use crate::{
    codec::{self, Reader},
    errors::{ProtocolError, Result},
};

/// Key type tag of an Ed25519 identity key
pub const ED25519_KEY_TYPE: u16 = 0x0020;

/// Key type tag of an Ed448 identity key (`2 + 57` bytes on the wire).
///
/// Not supported here; a profile carrying it is rejected rather than read
/// with the Ed25519 layout.
pub const ED448_KEY_TYPE: u16 = 0x0010;

/// Ed25519 public key size
pub const IDENTITY_KEY_BYTES: usize = 32;

/// Ed25519 signature size
pub const SIGNATURE_BYTES: usize = 64;

/// Version characters a profile may advertise
pub const ACCEPTED_VERSIONS: &[char] = &['3', '4'];

/// A peer's signed identity profile.
///
/// Messages embed their own copy; cloning is a deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    identity_key: [u8; IDENTITY_KEY_BYTES],
    versions: String,
    expires: u64,
    signature: [u8; SIGNATURE_BYTES],
    transitional_signature: Vec<u8>,
}

impl Profile {
    /// Build and sign a profile with `signing_key`.
    pub fn sign(signing_key: &SigningKey, versions: &str, expires: u64) -> Self {
        let identity_key = signing_key.verifying_key().to_bytes();
        let body = signed_body(&identity_key, versions, expires);
        let signature = signing_key.sign(&body).to_bytes();

        Self {
            identity_key,
            versions: versions.to_string(),
            expires,
            signature,
            transitional_signature: Vec::new(),
        }
    }

    /// Assemble a profile from raw parts. The signature is not checked.
    pub fn from_parts(
        identity_key: [u8; IDENTITY_KEY_BYTES],
        versions: impl Into<String>,
        expires: u64,
        signature: [u8; SIGNATURE_BYTES],
        transitional_signature: Vec<u8>,
    ) -> Self {
        Self {
            identity_key,
            versions: versions.into(),
            expires,
            signature,
            transitional_signature,
        }
    }

    /// Attach a legacy transitional signature.
    pub fn with_transitional_signature(mut self, signature: Vec<u8>) -> Self {
        self.transitional_signature = signature;
        self
    }

    /// Ed25519 identity key bytes.
    pub fn identity_key(&self) -> &[u8; IDENTITY_KEY_BYTES] {
        &self.identity_key
    }

    /// Advertised version characters.
    pub fn versions(&self) -> &str {
        &self.versions
    }

    /// Expiry in seconds since the Unix epoch.
    pub fn expires(&self) -> u64 {
        self.expires
    }

    /// Profile signature.
    pub fn signature(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.signature
    }

    /// Legacy transitional signature (empty when absent).
    pub fn transitional_signature(&self) -> &[u8] {
        &self.transitional_signature
    }

    /// True if the signature verifies against the embedded identity key.
    pub fn verify_signature(&self) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(&self.identity_key) else {
            return false;
        };
        let signature = Signature::from_bytes(&self.signature);
        let body = signed_body(&self.identity_key, &self.versions, self.expires);

        key.verify(&body, &signature).is_ok()
    }

    /// True unless expiry is strictly later than `now`.
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires <= now
    }

    /// True if every advertised version character is accepted.
    pub fn versions_accepted(&self) -> bool {
        self.versions.chars().all(|c| ACCEPTED_VERSIONS.contains(&c))
    }

    /// Encoded length.
    pub fn serialized_len(&self) -> usize {
        2 + IDENTITY_KEY_BYTES
            + codec::LEN_PREFIX_BYTES
            + self.versions.len()
            + 8
            + SIGNATURE_BYTES
            + codec::LEN_PREFIX_BYTES
            + self.transitional_signature.len()
    }

    /// Write the profile, returning bytes written.
    pub fn serialize(&self, dst: &mut impl BufMut) -> Result<usize> {
        let mut written = codec::serialize_u16(dst, ED25519_KEY_TYPE);
        written += codec::serialize_bytes_array(dst, &self.identity_key);
        written += codec::serialize_data(dst, self.versions.as_bytes())?;
        written += codec::serialize_u64(dst, self.expires);
        written += codec::serialize_bytes_array(dst, &self.signature);
        written += codec::serialize_data(dst, &self.transitional_signature)?;

        debug_assert_eq!(written, self.serialized_len());
        Ok(written)
    }

    /// Read a profile, returning it and the bytes consumed.
    ///
    /// # Errors
    ///
    /// - `Truncated` if any field is cut short
    /// - `InvalidKeyType` if the key type is not Ed25519
    /// - `InvalidVersions` if the version string is not UTF-8
    pub fn deserialize(src: &[u8]) -> Result<(Self, usize)> {
        let mut reader = Reader::new(src);

        let key_type = reader.u16()?;
        if key_type != ED25519_KEY_TYPE {
            return Err(ProtocolError::InvalidKeyType(key_type));
        }
        let identity_key = reader.array::<IDENTITY_KEY_BYTES>("identity key")?;
        let versions =
            String::from_utf8(reader.data()?).map_err(|_| ProtocolError::InvalidVersions)?;
        let expires = reader.u64()?;
        let signature = reader.array::<SIGNATURE_BYTES>("profile signature")?;
        let transitional_signature = reader.data()?;

        let profile = Self { identity_key, versions, expires, signature, transitional_signature };
        Ok((profile, reader.position()))
    }

    /// Zero every field in place.
    pub fn destroy(&mut self) {
        self.identity_key.zeroize();
        self.versions.zeroize();
        self.expires = 0;
        self.signature.zeroize();
        self.transitional_signature.zeroize();
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::from_parts([0u8; IDENTITY_KEY_BYTES], String::new(), 0, [0u8; SIGNATURE_BYTES], Vec::new())
    }
}

fn signed_body(identity_key: &[u8; IDENTITY_KEY_BYTES], versions: &str, expires: u64) -> Vec<u8> {
    let mut body = Vec::with_capacity(2 + IDENTITY_KEY_BYTES + 4 + versions.len() + 8);
    body.put_u16(ED25519_KEY_TYPE);
    body.put_slice(identity_key);
    // u32 prefix; a version string longer than u32::MAX cannot exist on the wire
    body.put_u32(versions.len() as u32);
    body.put_slice(versions.as_bytes());
    body.put_u64(expires);
    body
}
