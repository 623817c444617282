//! DAKE Protocol Wire Format
//!
//! Binary encoding of the deniable authenticated key exchange: the field
//! codec, signed identity profiles, the five handshake messages and the gate
//! that every received ephemeral value must pass before it reaches the key
//! manager.
//!
//! # Message Flow
//!
//! ```text
//! Interactive:      Bob ── Identity ──► Alice
//!                   Bob ◄── Auth-R ──── Alice
//!                   Bob ─── Auth-I ───► Alice
//!
//! Non-interactive:  Bob ── Prekey ──► server ──► Alice
//!                   Bob ◄──── Non-Interactive-Auth ──── Alice
//! ```
//!
//! # Receive Path
//!
//! ```text
//! bytes → DakeHeader (version, type) → body fields → typed message
//!       → check_received_values → KeyManager::set_their_keys
//! ```
//!
//! Decoding establishes structure only. A decoded message is trusted only
//! after [`valid_received_values`] accepts its ephemerals and profile.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod errors;
pub mod header;
pub mod messages;
pub mod profile;
pub mod proof;
pub mod validation;

pub use errors::{ProtocolError, Result};
pub use header::{DakeHeader, MessageType};
pub use messages::{
    AUTH_TAG_BYTES, AuthIMessage, AuthRMessage, DakeMessage, EncryptedPayload, IdentityMessage,
    NONCE_BYTES, NonInteractiveAuthMessage, PrekeyMessage,
};
pub use profile::{ACCEPTED_VERSIONS, ED448_KEY_TYPE, ED25519_KEY_TYPE, Profile};
pub use proof::{PROOF_BYTES, RingProof};
pub use validation::{
    ValidationFailure, ValidationResult, check_received_values, valid_received_values,
};
