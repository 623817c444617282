//! DAKE Cryptographic Primitives
//!
//! Ephemeral key agreement and the double ratchet key manager for the
//! deniable authenticated key exchange. Randomness and time come from an
//! injected [`Environment`] so every key can be reproduced in tests.
//!
//! # Key Lifecycle
//!
//! Each party contributes one Curve448 point and one 3072-bit finite-field
//! value. The two Diffie-Hellman results are combined into a 64-byte shared
//! secret, which seeds the first ratchet step. Later steps mix the previous
//! root key into fresh shared secrets.
//!
//! ```text
//! X448(x, Y) ──────────────┐
//!                          ▼
//! DH(a, B) → brace key → SHAKE-256 → Shared Secret K
//!                                        │
//!                                        ▼
//!                    new_ratchet → root key, chain key A, chain key B
//!                                        │
//!                                        ▼
//!                    next_message_keys → encryption key, MAC key
//! ```
//!
//! # Security
//!
//! Forward Secrecy:
//! - Ratchet advancement: previous root and chain keys are zeroized
//! - Chain advancement: each chain key is replaced after one message
//! - Destruction: every buffer reads as zero after `destroy` or drop
//!
//! Received Values:
//! - Curve points must lie on Curve448, not its twist, and not be low order
//! - Finite-field values must lie in the prime-order subgroup
//! - Both checks are exposed here and enforced by the protocol layer before
//!   any value reaches the key manager

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod dh;
pub mod ecdh;
pub mod env;
pub mod error;
pub mod kdf;
pub mod key_manager;

pub use dh::{DH_MOD_BYTES, DH_PRIVATE_BYTES, DhKeypair, DhPublicKey};
pub use ecdh::{EC_POINT_BYTES, EC_SCALAR_BYTES, EcPoint, EcdhKeypair};
pub use env::{Environment, SystemEnv};
pub use error::CryptoError;
pub use kdf::{KeyDerivation, Shake256Kdf, shake_256_kdf, shake_kkdf};
pub use key_manager::{
    BRACE_KEY_BYTES, CHAIN_KEY_BYTES, Chain, ChainKey, KeyManager, MAC_KEY_BYTES,
    MESSAGE_KEY_BYTES, MessageKeys, ROOT_KEY_BYTES, RatchetKeys, SHARED_SECRET_BYTES,
    SharedSecret,
};
