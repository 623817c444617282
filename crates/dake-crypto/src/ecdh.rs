//! Curve448 ephemeral keys.
//!
//! Points travel as the 56-byte little-endian Montgomery u-coordinate from
//! RFC 7748. [`EcPoint`] is a plain byte container so that decoding never
//! fails on content; membership is a separate check ([`EcPoint::is_valid`])
//! performed by the received-value gate.

use std::{fmt, sync::LazyLock};

use num_bigint::BigUint;
use num_traits::{One, Zero};
use x448::PublicKey;
use zeroize::{Zeroize, Zeroizing};

use crate::{env::Environment, error::CryptoError};

/// Size of an encoded Curve448 point
pub const EC_POINT_BYTES: usize = 56;

/// Size of a Curve448 private scalar
pub const EC_SCALAR_BYTES: usize = 56;

/// Base point `u = 5`
const BASE_POINT: [u8; EC_POINT_BYTES] = {
    let mut u = [0u8; EC_POINT_BYTES];
    u[0] = 5;
    u
};

/// Montgomery coefficient `A` of Curve448 (`v^2 = u^3 + A*u^2 + u`)
const CURVE448_A: u32 = 156_326;

/// Field prime `2^448 - 2^224 - 1`
static FIELD_PRIME: LazyLock<BigUint> =
    LazyLock::new(|| (BigUint::one() << 448u32) - (BigUint::one() << 224u32) - BigUint::one());

static FIELD_PRIME_MINUS_ONE: LazyLock<BigUint> =
    LazyLock::new(|| &*FIELD_PRIME - &BigUint::one());

/// Euler criterion exponent `(p - 1) / 2`
static EULER_EXPONENT: LazyLock<BigUint> = LazyLock::new(|| &*FIELD_PRIME_MINUS_ONE >> 1u32);

/// Encoded Curve448 point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcPoint([u8; EC_POINT_BYTES]);

impl EcPoint {
    /// Wrap raw encoded bytes. No validation is performed.
    pub const fn from_bytes(bytes: [u8; EC_POINT_BYTES]) -> Self {
        Self(bytes)
    }

    /// The all-zero placeholder used before a point is known.
    pub const fn zero() -> Self {
        Self([0u8; EC_POINT_BYTES])
    }

    /// Raw encoded bytes.
    pub fn as_bytes(&self) -> &[u8; EC_POINT_BYTES] {
        &self.0
    }

    /// True if every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Curve membership check.
    ///
    /// Accepts the point only if the u-coordinate is canonical (`u < p`), is
    /// not one of the low-order points, and `u^3 + A*u^2 + u` is a square
    /// mod `p`. Points on the quadratic twist are rejected.
    pub fn is_valid(&self) -> bool {
        let u = BigUint::from_bytes_le(&self.0);
        let p = &*FIELD_PRIME;

        if &u >= p || u.is_zero() || u.is_one() || u == *FIELD_PRIME_MINUS_ONE {
            return false;
        }

        let a = BigUint::from(CURVE448_A);
        let u_sq = &(&u * &u) % p;
        let rhs = &(&(&(&u_sq * &u) + &(&a * &u_sq)) + &u) % p;
        if !rhs.modpow(&EULER_EXPONENT, p).is_one() {
            return false;
        }

        PublicKey::from_bytes(&self.0).is_some()
    }
}

impl Default for EcPoint {
    fn default() -> Self {
        Self::zero()
    }
}

impl Zeroize for EcPoint {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for EcPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcPoint(")?;
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..)")
    }
}

/// Our ephemeral Curve448 keypair.
///
/// The private scalar is stored as drawn; X448 clamps it on use. Both halves
/// are zeroized on [`Zeroize::zeroize`] and on drop. Scalar arithmetic goes
/// through [`x448::x448`] on plain byte arrays, so no unzeroizable key type
/// outlives a call.
pub struct EcdhKeypair {
    private: [u8; EC_SCALAR_BYTES],
    public: EcPoint,
}

impl EcdhKeypair {
    /// An all-zero keypair (no key generated yet).
    pub const fn empty() -> Self {
        Self { private: [0u8; EC_SCALAR_BYTES], public: EcPoint::zero() }
    }

    /// Generate a fresh keypair from the environment's randomness.
    pub fn generate(env: &impl Environment) -> Result<Self, CryptoError> {
        let mut pair = Self::empty();
        env.random_bytes(&mut pair.private)?;

        let public = x448::x448(pair.private, BASE_POINT).ok_or(CryptoError::InvalidPoint)?;
        pair.public = EcPoint(public);
        Ok(pair)
    }

    /// Public half.
    pub fn public(&self) -> &EcPoint {
        &self.public
    }

    /// Private scalar bytes.
    pub fn private_bytes(&self) -> &[u8; EC_SCALAR_BYTES] {
        &self.private
    }

    /// True if no key has been generated (or it was destroyed).
    pub fn is_empty(&self) -> bool {
        self.private.iter().all(|&b| b == 0)
    }

    /// X448 with the peer's point.
    ///
    /// # Errors
    ///
    /// - `InvalidPoint` if the peer point cannot be decoded or is low order
    /// - `LowOrderSharedSecret` if the result is all zero
    pub fn diffie_hellman(
        &self,
        their: &EcPoint,
    ) -> Result<Zeroizing<[u8; EC_POINT_BYTES]>, CryptoError> {
        if PublicKey::from_bytes(their.as_bytes()).is_none() {
            return Err(CryptoError::InvalidPoint);
        }

        let shared = x448::x448(self.private, *their.as_bytes())
            .map(Zeroizing::new)
            .ok_or(CryptoError::InvalidPoint)?;
        if shared.iter().all(|&b| b == 0) {
            return Err(CryptoError::LowOrderSharedSecret);
        }
        Ok(shared)
    }
}

impl Zeroize for EcdhKeypair {
    fn zeroize(&mut self) {
        self.private.zeroize();
        self.public.zeroize();
    }
}

impl Drop for EcdhKeypair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for EcdhKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdhKeypair").field("public", &self.public).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    use super::*;

    struct SeededEnv(RefCell<ChaCha20Rng>);

    impl Environment for SeededEnv {
        fn now_unix(&self) -> u64 {
            0
        }

        fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
            self.0.borrow_mut().fill_bytes(buffer);
            Ok(())
        }
    }

    fn env(seed: u64) -> SeededEnv {
        SeededEnv(RefCell::new(ChaCha20Rng::seed_from_u64(seed)))
    }

    fn point_from_u(u: u8) -> EcPoint {
        let mut bytes = [0u8; EC_POINT_BYTES];
        bytes[0] = u;
        EcPoint::from_bytes(bytes)
    }

    #[test]
    fn base_point_is_on_curve() {
        assert!(point_from_u(5).is_valid());
    }

    #[test]
    fn twist_point_is_rejected() {
        // u = 6 gives a non-square right-hand side
        assert!(!point_from_u(6).is_valid());
    }

    #[test]
    fn low_order_points_are_rejected() {
        assert!(!point_from_u(0).is_valid());
        assert!(!point_from_u(1).is_valid());

        let mut minus_one = FIELD_PRIME_MINUS_ONE.to_bytes_le();
        minus_one.resize(EC_POINT_BYTES, 0);
        let mut bytes = [0u8; EC_POINT_BYTES];
        bytes.copy_from_slice(&minus_one);
        assert!(!EcPoint::from_bytes(bytes).is_valid());
    }

    #[test]
    fn non_canonical_point_is_rejected() {
        assert!(!EcPoint::from_bytes([0xFF; EC_POINT_BYTES]).is_valid());
    }

    #[test]
    fn generated_keys_are_valid_and_deterministic() {
        let a = EcdhKeypair::generate(&env(7)).unwrap();
        let b = EcdhKeypair::generate(&env(7)).unwrap();

        assert!(a.public().is_valid());
        assert!(!a.is_empty());
        assert_eq!(a.public(), b.public());
        assert_eq!(a.private_bytes(), b.private_bytes());
    }

    #[test]
    fn both_sides_agree_on_shared_secret() {
        let alice = EcdhKeypair::generate(&env(1)).unwrap();
        let bob = EcdhKeypair::generate(&env(2)).unwrap();

        let k_alice = alice.diffie_hellman(bob.public()).unwrap();
        let k_bob = bob.diffie_hellman(alice.public()).unwrap();

        assert_eq!(*k_alice, *k_bob);
        assert_ne!(*k_alice, [0u8; EC_POINT_BYTES]);
    }

    #[test]
    fn public_matches_scalar_times_base_point() {
        let pair = EcdhKeypair::generate(&env(4)).unwrap();
        let secret = x448::Secret::from_bytes(pair.private_bytes()).unwrap();
        let expected = PublicKey::from(&secret);

        assert_eq!(pair.public().as_bytes(), expected.as_bytes());
    }

    #[test]
    fn low_order_peer_point_is_rejected() {
        let alice = EcdhKeypair::generate(&env(1)).unwrap();
        assert!(alice.diffie_hellman(&point_from_u(1)).is_err());
        assert!(alice.diffie_hellman(&point_from_u(0)).is_err());
    }

    #[test]
    fn zeroize_clears_both_halves() {
        let mut pair = EcdhKeypair::generate(&env(3)).unwrap();
        pair.zeroize();

        assert!(pair.is_empty());
        assert_eq!(pair.private_bytes(), &[0u8; EC_SCALAR_BYTES]);
        assert!(pair.public().is_zero());
    }

    #[test]
    fn shared_secret_buffer_zeroizes() {
        let alice = EcdhKeypair::generate(&env(1)).unwrap();
        let bob = EcdhKeypair::generate(&env(2)).unwrap();

        let mut shared = alice.diffie_hellman(bob.public()).unwrap();
        shared.zeroize();
        assert_eq!(*shared, [0u8; EC_POINT_BYTES]);
    }
}
