//! Error types for key exchange primitives and the key manager.

use thiserror::Error;

/// Errors raised by the primitives in this crate.
///
/// Every variant is fatal to the operation that produced it. Nothing here is
/// retried internally; the key manager rolls back to its last good state and
/// surfaces the error to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The environment could not supply random bytes
    #[error("entropy source failed: {0}")]
    Entropy(String),

    /// A Curve448 secret or point could not be constructed
    #[error("invalid curve448 key material")]
    InvalidPoint,

    /// A finite-field value is outside the expected subgroup
    #[error("finite-field value is not a member of the 3072-bit subgroup")]
    InvalidDhValue,

    /// Diffie-Hellman produced a low-order (all-zero) result
    #[error("diffie-hellman produced a low-order shared secret")]
    LowOrderSharedSecret,

    /// An operation needed key material that has not been set
    #[error("missing key material: {0}")]
    MissingKey(&'static str),

    /// Key derivation failed
    #[error("key derivation failed: {reason}")]
    Derivation {
        /// What went wrong
        reason: String,
    },

    /// The message counter of a chain is exhausted
    #[error("message counter overflow on chain {chain}")]
    CounterOverflow {
        /// Chain label
        chain: char,
    },
}

impl CryptoError {
    /// Returns true if this error came from a key derivation step.
    pub fn is_derivation_failure(&self) -> bool {
        matches!(self, Self::Derivation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_errors_are_flagged() {
        assert!(CryptoError::Derivation { reason: "xof".to_string() }.is_derivation_failure());
        assert!(!CryptoError::InvalidPoint.is_derivation_failure());
        assert!(!CryptoError::Entropy("os".to_string()).is_derivation_failure());
    }

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(
            CryptoError::MissingKey("their_dh").to_string(),
            "missing key material: their_dh"
        );
        assert_eq!(
            CryptoError::CounterOverflow { chain: 'a' }.to_string(),
            "message counter overflow on chain a"
        );
    }
}
