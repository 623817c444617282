//! Double ratchet key manager.
//!
//! # State progression
//!
//! ```text
//! new() ──► generate_ephemeral_keys() ──► new_ratchet() [i = 0]
//!                                            │
//!                                            ▼
//!                                  new_ratchet() [i = 1, 2, ...]
//!                                            │
//!                                            ▼
//!                                        destroy()
//! ```
//!
//! # Security Properties
//!
//! - Domain separation: root and both chain keys come from three SHAKE-256
//!   calls with distinct usage bytes over the same input
//! - Chaining: from the second ratchet on, the previous root key is mixed into
//!   the shared secret first, so chain keys at step `i` reveal nothing about
//!   the root key at step `i - 1`
//! - Atomicity: a ratchet step either replaces all three keys or none
//! - Forward secrecy: replaced keys are zeroized before being discarded

use zeroize::{Zeroize, Zeroizing};

use crate::{
    dh::{DhKeypair, DhPublicKey},
    ecdh::{EC_POINT_BYTES, EcPoint, EcdhKeypair},
    env::Environment,
    error::CryptoError,
    kdf::{KeyDerivation, Shake256Kdf, usage},
};

/// Root key size
pub const ROOT_KEY_BYTES: usize = 64;

/// Chain key size
pub const CHAIN_KEY_BYTES: usize = 64;

/// Shared secret size
pub const SHARED_SECRET_BYTES: usize = 64;

/// Brace key size
pub const BRACE_KEY_BYTES: usize = 32;

/// Per-message encryption key size
pub const MESSAGE_KEY_BYTES: usize = 32;

/// Per-message MAC key size
pub const MAC_KEY_BYTES: usize = 64;

/// Which of the two chains of a ratchet step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chain {
    /// First chain (`chain_key_a`)
    A,
    /// Second chain (`chain_key_b`)
    B,
}

impl Chain {
    fn label(self) -> char {
        match self {
            Self::A => 'a',
            Self::B => 'b',
        }
    }
}

/// Secret combining the curve and finite-field exchanges.
pub struct SharedSecret([u8; SHARED_SECRET_BYTES]);

impl SharedSecret {
    /// Raw secret bytes.
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_BYTES] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// A chain key and the number of message keys already taken from it.
pub struct ChainKey {
    key: [u8; CHAIN_KEY_BYTES],
    message_id: u32,
}

impl ChainKey {
    /// Current key bytes.
    pub fn key(&self) -> &[u8; CHAIN_KEY_BYTES] {
        &self.key
    }

    /// Number of message keys derived so far.
    pub fn message_id(&self) -> u32 {
        self.message_id
    }
}

impl Zeroize for ChainKey {
    fn zeroize(&mut self) {
        self.key.zeroize();
        self.message_id = 0;
    }
}

impl Drop for ChainKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Root key plus both chain keys of one ratchet step.
pub struct RatchetKeys {
    root_key: [u8; ROOT_KEY_BYTES],
    chain_a: ChainKey,
    chain_b: ChainKey,
}

impl RatchetKeys {
    fn empty() -> Self {
        Self {
            root_key: [0u8; ROOT_KEY_BYTES],
            chain_a: ChainKey { key: [0u8; CHAIN_KEY_BYTES], message_id: 0 },
            chain_b: ChainKey { key: [0u8; CHAIN_KEY_BYTES], message_id: 0 },
        }
    }

    /// Root key bytes.
    pub fn root_key(&self) -> &[u8; ROOT_KEY_BYTES] {
        &self.root_key
    }

    /// First chain.
    pub fn chain_a(&self) -> &ChainKey {
        &self.chain_a
    }

    /// Second chain.
    pub fn chain_b(&self) -> &ChainKey {
        &self.chain_b
    }
}

impl Zeroize for RatchetKeys {
    fn zeroize(&mut self) {
        self.root_key.zeroize();
        self.chain_a.zeroize();
        self.chain_b.zeroize();
    }
}

impl Drop for RatchetKeys {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Keys for exactly one message. Zeroized on drop.
pub struct MessageKeys {
    encryption: [u8; MESSAGE_KEY_BYTES],
    mac: [u8; MAC_KEY_BYTES],
    message_id: u32,
}

impl MessageKeys {
    /// Symmetric encryption key.
    pub fn encryption_key(&self) -> &[u8; MESSAGE_KEY_BYTES] {
        &self.encryption
    }

    /// MAC key.
    pub fn mac_key(&self) -> &[u8; MAC_KEY_BYTES] {
        &self.mac
    }

    /// Position of this message within its chain.
    pub fn message_id(&self) -> u32 {
        self.message_id
    }
}

impl Drop for MessageKeys {
    fn drop(&mut self) {
        self.encryption.zeroize();
        self.mac.zeroize();
    }
}

/// Ephemeral keys and ratchet state for one conversation.
///
/// Owns every piece of secret material; nothing handed out by accessors
/// outlives a rotation. Not shareable across threads without external
/// synchronization.
pub struct KeyManager<K: KeyDerivation = Shake256Kdf> {
    i: u32,
    current: RatchetKeys,
    our_ecdh: EcdhKeypair,
    our_dh: DhKeypair,
    their_ecdh: EcPoint,
    their_dh: DhPublicKey,
    brace_key: [u8; BRACE_KEY_BYTES],
    kdf: K,
}

impl KeyManager<Shake256Kdf> {
    /// Fresh manager with every field zeroed and `i = 0`.
    pub fn new() -> Self {
        Self::with_kdf(Shake256Kdf)
    }
}

impl Default for KeyManager<Shake256Kdf> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KeyDerivation> KeyManager<K> {
    /// Fresh manager using a custom key derivation.
    pub fn with_kdf(kdf: K) -> Self {
        Self {
            i: 0,
            current: RatchetKeys::empty(),
            our_ecdh: EcdhKeypair::empty(),
            our_dh: DhKeypair::empty(),
            their_ecdh: EcPoint::zero(),
            their_dh: DhPublicKey::default(),
            brace_key: [0u8; BRACE_KEY_BYTES],
            kdf,
        }
    }

    /// Index of the next ratchet step.
    pub fn ratchet_index(&self) -> u32 {
        self.i
    }

    /// Keys of the most recent ratchet step (all zero before the first).
    pub fn current(&self) -> &RatchetKeys {
        &self.current
    }

    /// Our ephemeral curve keypair.
    pub fn our_ecdh(&self) -> &EcdhKeypair {
        &self.our_ecdh
    }

    /// Our ephemeral finite-field keypair.
    pub fn our_dh(&self) -> &DhKeypair {
        &self.our_dh
    }

    /// Peer's curve point.
    pub fn their_ecdh(&self) -> &EcPoint {
        &self.their_ecdh
    }

    /// Peer's finite-field value.
    pub fn their_dh(&self) -> &DhPublicKey {
        &self.their_dh
    }

    /// Brace key from the last [`Self::derive_shared_secret`].
    pub fn brace_key(&self) -> &[u8; BRACE_KEY_BYTES] {
        &self.brace_key
    }

    /// Replace our ephemeral keypairs.
    ///
    /// Both keypairs are generated before either is installed. If either
    /// generation fails, the previous keys stay in place and the error is
    /// returned.
    pub fn generate_ephemeral_keys(&mut self, env: &impl Environment) -> Result<(), CryptoError> {
        let ecdh = EcdhKeypair::generate(env)?;
        let dh = DhKeypair::generate(env)?;

        self.our_ecdh = ecdh;
        self.our_dh = dh;
        Ok(())
    }

    /// Record the peer's ephemeral public values.
    ///
    /// Values must already have passed the received-value gate.
    pub fn set_their_keys(&mut self, ecdh: &EcPoint, dh: &DhPublicKey) {
        self.their_ecdh = *ecdh;
        self.their_dh = dh.clone();
    }

    /// Combine both exchanges into a shared secret.
    ///
    /// `brace_key = KDF(0x04, k_dh)` and
    /// `K = KDF(0x05, k_ecdh || brace_key)`. The brace key is stored only if
    /// the whole derivation succeeds.
    pub fn derive_shared_secret(&mut self) -> Result<SharedSecret, CryptoError> {
        if self.our_ecdh.is_empty() {
            return Err(CryptoError::MissingKey("our_ecdh"));
        }
        if self.their_ecdh.is_zero() {
            return Err(CryptoError::MissingKey("their_ecdh"));
        }
        if self.their_dh.is_zero() {
            return Err(CryptoError::MissingKey("their_dh"));
        }

        let k_ecdh = self.our_ecdh.diffie_hellman(&self.their_ecdh)?;
        let k_dh = self.our_dh.shared_secret(&self.their_dh)?;

        let mut brace_key = Zeroizing::new([0u8; BRACE_KEY_BYTES]);
        self.kdf.kdf(usage::BRACE_KEY, &k_dh[..], &mut brace_key[..])?;

        let mut input = Zeroizing::new([0u8; EC_POINT_BYTES + BRACE_KEY_BYTES]);
        input[..EC_POINT_BYTES].copy_from_slice(&k_ecdh[..]);
        input[EC_POINT_BYTES..].copy_from_slice(&brace_key[..]);

        let mut shared = SharedSecret([0u8; SHARED_SECRET_BYTES]);
        self.kdf.kdf(usage::SHARED_SECRET, &input[..], &mut shared.0)?;

        self.brace_key.zeroize();
        self.brace_key = *brace_key;
        Ok(shared)
    }

    /// Advance to a new ratchet step.
    ///
    /// At `i == 0` the three keys derive directly from `shared_secret`. After
    /// that the current root key is first mixed in with
    /// `KKDF(root_key, shared_secret)`. On success `i` advances and the
    /// previous keys are zeroized. On failure nothing changes.
    pub fn new_ratchet(&mut self, shared_secret: &[u8]) -> Result<(), CryptoError> {
        let next_index = self
            .i
            .checked_add(1)
            .ok_or(CryptoError::Derivation { reason: "ratchet index overflow".to_string() })?;

        let mut intermediate = Zeroizing::new([0u8; SHARED_SECRET_BYTES]);
        let input: &[u8] = if self.i == 0 {
            shared_secret
        } else {
            self.kdf
                .kkdf(&self.current.root_key, shared_secret, &mut intermediate[..])
                .inspect_err(|e| tracing::warn!(index = self.i, error = %e, "root mix failed"))?;
            &intermediate[..]
        };

        let next = self
            .derive_ratchet_keys(input)
            .inspect_err(|e| tracing::warn!(index = self.i, error = %e, "ratchet derivation failed"))?;

        let mut previous = std::mem::replace(&mut self.current, next);
        previous.zeroize();

        tracing::debug!(index = self.i, "ratchet established");
        self.i = next_index;
        Ok(())
    }

    /// Take the next message keys from one chain.
    ///
    /// Derives the encryption and MAC keys from the chain key, then replaces
    /// the chain key with `KDF(0x08, chain_key)`. The old chain key is
    /// zeroized. On failure the chain is left untouched.
    pub fn next_message_keys(&mut self, chain: Chain) -> Result<MessageKeys, CryptoError> {
        let kdf = &self.kdf;
        let chain_key = match chain {
            Chain::A => &mut self.current.chain_a,
            Chain::B => &mut self.current.chain_b,
        };

        let next_id = chain_key
            .message_id
            .checked_add(1)
            .ok_or(CryptoError::CounterOverflow { chain: chain.label() })?;

        let mut keys = MessageKeys {
            encryption: [0u8; MESSAGE_KEY_BYTES],
            mac: [0u8; MAC_KEY_BYTES],
            message_id: chain_key.message_id,
        };
        kdf.kdf(usage::MESSAGE_KEY, &chain_key.key, &mut keys.encryption)?;
        kdf.kdf(usage::MAC_KEY, &chain_key.key, &mut keys.mac)?;

        let mut next_key = Zeroizing::new([0u8; CHAIN_KEY_BYTES]);
        kdf.kdf(usage::NEXT_CHAIN_KEY, &chain_key.key, &mut next_key[..])?;

        chain_key.key.zeroize();
        chain_key.key = *next_key;
        chain_key.message_id = next_id;

        Ok(keys)
    }

    /// Zero every secret and public value and reset `i`.
    ///
    /// After this call every key buffer reads as zero. The manager may be
    /// reused from the uninitialized state.
    pub fn destroy(&mut self) {
        self.i = 0;
        self.current.zeroize();
        self.our_ecdh.zeroize();
        self.our_dh.zeroize();
        self.their_ecdh.zeroize();
        self.their_dh.clear();
        self.brace_key.zeroize();
    }

    fn derive_ratchet_keys(&self, input: &[u8]) -> Result<RatchetKeys, CryptoError> {
        let mut keys = RatchetKeys::empty();
        self.kdf.kdf(usage::ROOT_KEY, input, &mut keys.root_key)?;
        self.kdf.kdf(usage::CHAIN_KEY_A, input, &mut keys.chain_a.key)?;
        self.kdf.kdf(usage::CHAIN_KEY_B, input, &mut keys.chain_b.key)?;
        Ok(keys)
    }
}

impl<K: KeyDerivation> Drop for KeyManager<K> {
    fn drop(&mut self) {
        self.destroy();
    }
}
