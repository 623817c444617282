//! SHAKE-256 key derivation.
//!
//! Two shapes are used by the ratchet:
//!
//! - `kdf(usage, secret)`: `SHAKE256(usage || secret)`, one domain-separation
//!   byte per derived key
//! - `kkdf(key, secret)`: `SHAKE256(key || secret)`, mixing an existing key
//!   into fresh input

use sha3::{
    Shake256,
    digest::{ExtendableOutput, Update, XofReader},
};

use crate::error::CryptoError;

/// Domain-separation bytes for every derived value.
pub mod usage {
    /// Root key of a ratchet step
    pub const ROOT_KEY: u8 = 0x01;
    /// Chain key A of a ratchet step
    pub const CHAIN_KEY_A: u8 = 0x02;
    /// Chain key B of a ratchet step
    pub const CHAIN_KEY_B: u8 = 0x03;
    /// Brace key from the finite-field exchange
    pub const BRACE_KEY: u8 = 0x04;
    /// Shared secret combining both exchanges
    pub const SHARED_SECRET: u8 = 0x05;
    /// Per-message encryption key
    pub const MESSAGE_KEY: u8 = 0x06;
    /// Per-message MAC key
    pub const MAC_KEY: u8 = 0x07;
    /// Next chain key after a message
    pub const NEXT_CHAIN_KEY: u8 = 0x08;
}

/// Extendable-output key derivation.
///
/// Both operations write exactly `out.len()` bytes on success. On failure the
/// contents of `out` are unspecified and the caller must discard them.
pub trait KeyDerivation {
    /// Derive from `secret` under a single-byte usage tag.
    fn kdf(&self, usage: u8, secret: &[u8], out: &mut [u8]) -> Result<(), CryptoError>;

    /// Derive from `secret` keyed by `key`.
    fn kkdf(&self, key: &[u8], secret: &[u8], out: &mut [u8]) -> Result<(), CryptoError>;
}

/// SHAKE-256 implementation of [`KeyDerivation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Shake256Kdf;

impl KeyDerivation for Shake256Kdf {
    fn kdf(&self, usage: u8, secret: &[u8], out: &mut [u8]) -> Result<(), CryptoError> {
        shake_256_kdf(usage, secret, out);
        Ok(())
    }

    fn kkdf(&self, key: &[u8], secret: &[u8], out: &mut [u8]) -> Result<(), CryptoError> {
        shake_kkdf(key, secret, out);
        Ok(())
    }
}

/// `SHAKE256(usage || secret)` into `out`.
pub fn shake_256_kdf(usage: u8, secret: &[u8], out: &mut [u8]) {
    let mut hasher = Shake256::default();
    hasher.update(&[usage]);
    hasher.update(secret);
    hasher.finalize_xof().read(out);
}

/// `SHAKE256(key || secret)` into `out`.
pub fn shake_kkdf(key: &[u8], secret: &[u8], out: &mut [u8]) {
    let mut hasher = Shake256::default();
    hasher.update(key);
    hasher.update(secret);
    hasher.finalize_xof().read(out);
}
