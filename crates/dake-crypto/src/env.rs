//! Environment abstraction for deterministic testing.
//!
//! Decouples key generation and expiry checks from system resources (time,
//! randomness). Production code uses [`SystemEnv`]; tests supply seeded
//! implementations so every derived key is reproducible.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::CryptoError;

/// Source of wall-clock time and randomness.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - `now_unix()` reports seconds since the Unix epoch
pub trait Environment {
    /// Current wall-clock time in seconds since the Unix epoch.
    ///
    /// Used for profile expiry, which is a data check and not a timer.
    fn now_unix(&self) -> u64;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Failure leaves no partially generated key behind; callers discard
    ///   the buffer
    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError>;
}

/// Production environment backed by the OS entropy pool and system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn now_unix(&self) -> u64 {
        // Clock before the epoch reads as 0
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        getrandom::fill(buffer).map_err(|e| CryptoError::Entropy(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_env_fills_buffer() {
        let env = SystemEnv;
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        env.random_bytes(&mut a).unwrap();
        env.random_bytes(&mut b).unwrap();

        assert_ne!(a, [0u8; 64]);
        assert_ne!(a, b, "two draws of 64 bytes must differ");
    }

    #[test]
    fn system_env_clock_is_after_2020() {
        assert!(SystemEnv.now_unix() > 1_577_836_800);
    }
}
