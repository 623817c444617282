//! 3072-bit finite-field Diffie-Hellman (RFC 3526 group 15).
//!
//! The group is the MODP safe prime `p` with generator 2. Since `p` is safe
//! and 2 is a quadratic residue, 2 generates the subgroup of prime order
//! `q = (p - 1) / 2`; membership of a received value is `y^q == 1 (mod p)`.

use std::{fmt, sync::LazyLock};

use crypto_bigint::{
    Encoding, U3072,
    modular::runtime_mod::{DynResidue, DynResidueParams},
};
use zeroize::{Zeroize, Zeroizing};

use crate::{env::Environment, error::CryptoError};

/// Byte length of the group modulus
pub const DH_MOD_BYTES: usize = 384;

/// Byte length of a private exponent (640 bits)
pub const DH_PRIVATE_BYTES: usize = 80;

/// RFC 3526 3072-bit MODP prime
const MODULUS: U3072 = U3072::from_be_hex(
    "\
    FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1\
    29024E088A67CC74020BBEA63B139B22514A08798E3404DD\
    EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245\
    E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED\
    EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D\
    C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F\
    83655D23DCA3AD961C62F356208552BB9ED529077096966D\
    670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B\
    E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9\
    DE2BCBF6955817183995497CEA956AE515D2261898FA0510\
    15728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64\
    ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7\
    ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6B\
    F12FFA06D98A0864D87602733EC86A64521F2B18177B200C\
    BBE117577A615D6C770988C0BAD946E208E24FA074E5AB31\
    43DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
);

const MODULUS_MINUS_ONE: U3072 = MODULUS.wrapping_sub(&U3072::ONE);

const SUBGROUP_ORDER: U3072 = MODULUS_MINUS_ONE.shr_vartime(1);

const GENERATOR: U3072 = U3072::from_u8(2);

/// Montgomery parameters for arithmetic mod `p`
static PARAMS: LazyLock<DynResidueParams<{ U3072::LIMBS }>> =
    LazyLock::new(|| DynResidueParams::new(&MODULUS));

/// Big-endian bytes of the group modulus `p`.
pub fn modulus_bytes() -> [u8; DH_MOD_BYTES] {
    MODULUS.to_be_bytes()
}

/// `base^exponent mod p`, looking at the low `exponent_bits` of `exponent`.
fn pow_mod(base: &U3072, exponent: &U3072, exponent_bits: usize) -> Zeroizing<U3072> {
    let residue = DynResidue::new(base, *PARAMS);
    Zeroizing::new(residue.pow_bounded_exp(exponent, exponent_bits).retrieve())
}

/// Private exponent as an integer, zeroed when dropped.
fn exponent(private: &[u8; DH_PRIVATE_BYTES]) -> Zeroizing<U3072> {
    let mut padded = Zeroizing::new([0u8; DH_MOD_BYTES]);
    padded[DH_MOD_BYTES - DH_PRIVATE_BYTES..].copy_from_slice(private);
    Zeroizing::new(U3072::from_be_slice(&padded[..]))
}

/// A finite-field public value.
///
/// Holds the minimal big-endian magnitude of any non-negative integer;
/// [`DhPublicKey::is_valid`] decides group membership. The empty magnitude
/// (zero) stands for "not set". The bytes are zeroized on
/// [`DhPublicKey::clear`] and on drop.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct DhPublicKey(Vec<u8>);

impl DhPublicKey {
    /// Parse a big-endian magnitude. No validation is performed.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        Self(bytes[start..].to_vec())
    }

    fn from_uint(value: &U3072) -> Self {
        let bytes = Zeroizing::new(value.to_be_bytes());
        Self::from_bytes_be(&bytes[..])
    }

    /// Minimal big-endian magnitude. Zero encodes as the empty string.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.clone()
    }

    /// Borrow the minimal big-endian magnitude.
    pub fn as_bytes_be(&self) -> &[u8] {
        &self.0
    }

    /// Bit length of the value.
    pub fn bits(&self) -> usize {
        self.0.first().map_or(0, |&top| self.0.len() * 8 - top.leading_zeros() as usize)
    }

    /// True if unset.
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// The value as a group-sized integer; `None` if it has more bytes than
    /// the modulus.
    fn to_uint(&self) -> Option<Zeroizing<U3072>> {
        if self.0.len() > DH_MOD_BYTES {
            return None;
        }
        let mut padded = Zeroizing::new([0u8; DH_MOD_BYTES]);
        padded[DH_MOD_BYTES - self.0.len()..].copy_from_slice(&self.0);
        Some(Zeroizing::new(U3072::from_be_slice(&padded[..])))
    }

    /// Group membership: `2 <= y <= p - 2` and `y^q == 1 (mod p)`.
    pub fn is_valid(&self) -> bool {
        let Some(y) = self.to_uint() else {
            return false;
        };
        if *y < GENERATOR || *y >= MODULUS_MINUS_ONE {
            return false;
        }

        *pow_mod(&y, &SUBGROUP_ORDER, DH_MOD_BYTES * 8) == U3072::ONE
    }

    /// Zero and release the value.
    pub fn clear(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for DhPublicKey {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for DhPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DhPublicKey({} bits)", self.bits())
    }
}

/// Our ephemeral finite-field keypair.
pub struct DhKeypair {
    private: [u8; DH_PRIVATE_BYTES],
    public: DhPublicKey,
}

impl DhKeypair {
    /// An all-zero keypair (no key generated yet).
    pub fn empty() -> Self {
        Self { private: [0u8; DH_PRIVATE_BYTES], public: DhPublicKey::default() }
    }

    /// Generate a fresh keypair from the environment's randomness.
    ///
    /// Every intermediate copy of the exponent is zeroized before returning.
    pub fn generate(env: &impl Environment) -> Result<Self, CryptoError> {
        let mut pair = Self::empty();
        env.random_bytes(&mut pair.private)?;

        let public = pow_mod(&GENERATOR, &exponent(&pair.private), DH_PRIVATE_BYTES * 8);
        pair.public = DhPublicKey::from_uint(&public);
        Ok(pair)
    }

    /// Public half.
    pub fn public(&self) -> &DhPublicKey {
        &self.public
    }

    /// Private exponent bytes (big-endian).
    pub fn private_bytes(&self) -> &[u8; DH_PRIVATE_BYTES] {
        &self.private
    }

    /// True if no key has been generated (or it was destroyed).
    pub fn is_empty(&self) -> bool {
        self.private.iter().all(|&b| b == 0)
    }

    /// `their^x mod p`, left-padded to [`DH_MOD_BYTES`].
    ///
    /// # Errors
    ///
    /// - `InvalidDhValue` if `their` is not a subgroup member
    /// - `MissingKey` if no private exponent is set
    pub fn shared_secret(
        &self,
        their: &DhPublicKey,
    ) -> Result<Zeroizing<[u8; DH_MOD_BYTES]>, CryptoError> {
        if self.is_empty() {
            return Err(CryptoError::MissingKey("our_dh"));
        }
        if !their.is_valid() {
            return Err(CryptoError::InvalidDhValue);
        }
        let their = their.to_uint().ok_or(CryptoError::InvalidDhValue)?;

        let shared = pow_mod(&their, &exponent(&self.private), DH_PRIVATE_BYTES * 8);
        Ok(Zeroizing::new(shared.to_be_bytes()))
    }
}

impl Zeroize for DhKeypair {
    fn zeroize(&mut self) {
        self.private.zeroize();
        self.public.clear();
    }
}

impl Drop for DhKeypair {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for DhKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhKeypair").field("public", &self.public).finish_non_exhaustive()
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

    fn value(n: &U3072) -> DhPublicKey {
        DhPublicKey::from_uint(n)
    }

    #[test]
    fn modulus_is_3072_bits() {
        assert_eq!(MODULUS.bits(), 3072);
        assert_eq!(DhPublicKey::from_bytes_be(&modulus_bytes()).bits(), 3072);
        assert_eq!(SUBGROUP_ORDER.bits(), 3071);
    }

    #[test]
    fn generator_is_a_member() {
        assert!(DhPublicKey::from_bytes_be(&[2]).is_valid());
    }

    #[test]
    fn boundary_values_are_rejected() {
        assert!(!DhPublicKey::default().is_valid());
        assert!(!DhPublicKey::from_bytes_be(&[1]).is_valid());
        assert!(!value(&MODULUS_MINUS_ONE).is_valid());
        assert!(!value(&MODULUS).is_valid());
        assert!(!DhPublicKey::from_bytes_be(&[0xFF; DH_MOD_BYTES + 1]).is_valid());
    }

    #[test]
    fn non_residue_is_rejected() {
        // p - 2 = -2 mod p; -1 is a non-residue for p = 3 mod 4, so -2 is too
        let minus_two = MODULUS.wrapping_sub(&GENERATOR);
        assert!(!value(&minus_two).is_valid());
    }

    #[test]
    fn generated_public_is_a_member() {
        let pair = DhKeypair::generate(&env(11)).unwrap();
        assert!(pair.public().is_valid());
        assert!(!pair.is_empty());
    }

    #[test]
    fn both_sides_agree_on_shared_secret() {
        let alice = DhKeypair::generate(&env(1)).unwrap();
        let bob = DhKeypair::generate(&env(2)).unwrap();

        let k_alice = alice.shared_secret(bob.public()).unwrap();
        let k_bob = bob.shared_secret(alice.public()).unwrap();

        assert_eq!(*k_alice, *k_bob);
    }

    #[test]
    fn shared_secret_rejects_non_member() {
        let alice = DhKeypair::generate(&env(1)).unwrap();
        let result = alice.shared_secret(&DhPublicKey::from_bytes_be(&[1]));
        assert_eq!(result.err(), Some(CryptoError::InvalidDhValue));
    }

    #[test]
    fn empty_keypair_cannot_agree() {
        let alice = DhKeypair::generate(&env(1)).unwrap();
        let result = DhKeypair::empty().shared_secret(alice.public());
        assert_eq!(result.err(), Some(CryptoError::MissingKey("our_dh")));
    }

    #[test]
    fn zero_encodes_as_empty_magnitude() {
        assert!(DhPublicKey::default().to_bytes_be().is_empty());
        assert_eq!(DhPublicKey::from_bytes_be(&[]), DhPublicKey::default());
        assert_eq!(DhPublicKey::from_bytes_be(&[0, 0, 1]).to_bytes_be(), vec![1]);
    }

    #[test]
    fn shared_secret_is_left_padded() {
        // 2^x for a one-byte exponent is far shorter than the modulus
        let mut pair = DhKeypair::empty();
        pair.private[DH_PRIVATE_BYTES - 1] = 3;

        let secret = pair.shared_secret(&DhPublicKey::from_bytes_be(&[2])).unwrap();
        assert_eq!(secret[..DH_MOD_BYTES - 1], [0u8; DH_MOD_BYTES - 1]);
        assert_eq!(secret[DH_MOD_BYTES - 1], 8);
    }

    #[test]
    fn exponent_matches_private_bytes() {
        let pair = DhKeypair::generate(&env(9)).unwrap();
        let x = exponent(pair.private_bytes());

        let bytes = x.to_be_bytes();
        assert_eq!(bytes[..DH_MOD_BYTES - DH_PRIVATE_BYTES], [0u8; DH_MOD_BYTES - DH_PRIVATE_BYTES]);
        assert_eq!(&bytes[DH_MOD_BYTES - DH_PRIVATE_BYTES..], &pair.private_bytes()[..]);
    }

    #[test]
    fn zeroized_exponent_reads_as_zero() {
        let pair = DhKeypair::generate(&env(9)).unwrap();
        let mut x = exponent(pair.private_bytes());
        assert_ne!(*x, U3072::ZERO);

        x.zeroize();
        assert_eq!(*x, U3072::ZERO);
    }

    #[test]
    fn zeroize_clears_both_halves() {
        let mut pair = DhKeypair::generate(&env(5)).unwrap();
        pair.zeroize();

        assert!(pair.is_empty());
        assert_eq!(pair.private_bytes(), &[0u8; DH_PRIVATE_BYTES]);
        assert!(pair.public().is_zero());
        assert!(pair.public().as_bytes_be().is_empty());
    }

    #[test]
    fn clear_zeroes_public_value() {
        let mut key = DhPublicKey::from_bytes_be(&[0xAB; 64]);
        key.clear();

        assert!(key.is_zero());
        assert_eq!(key, DhPublicKey::default());
        assert_eq!(key.bits(), 0);
    }

    #[test]
    fn magnitude_is_minimal() {
        let key = DhPublicKey::from_bytes_be(&[0, 0, 0x01, 0x00]);
        assert_eq!(key.as_bytes_be(), &[0x01, 0x00]);
        assert_eq!(key.bits(), 9);
        assert_eq!(key, DhPublicKey::from_bytes_be(&[0x01, 0x00]));
    }
}
