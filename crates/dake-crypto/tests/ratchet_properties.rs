//! Property-based tests for the key manager
//!
//! These tests verify the ratchet invariants for arbitrary shared secrets:
//!
//! 1. **Determinism**: same shared secret and index give the same keys
//! 2. **Domain separation**: root key, chain key A and chain key B differ
//! 3. **Chaining**: every step's keys differ from the previous step's
//! 4. **Agreement**: two parties with swapped public values derive the same
//!    shared secret and ratchet state

use std::cell::RefCell;

use dake_crypto::{
    Chain, CryptoError, Environment, KeyManager, SHARED_SECRET_BYTES, shake_256_kdf, shake_kkdf,
};
use proptest::prelude::*;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

struct SeededEnv(RefCell<ChaCha20Rng>);

impl SeededEnv {
    fn new(seed: u64) -> Self {
        Self(RefCell::new(ChaCha20Rng::seed_from_u64(seed)))
    }
}

impl Environment for SeededEnv {
    fn now_unix(&self) -> u64 {
        1_700_000_000
    }

    fn random_bytes(&self, buffer: &mut [u8]) -> Result<(), CryptoError> {
        self.0.borrow_mut().fill_bytes(buffer);
        Ok(())
    }
}

fn shared_secret() -> impl Strategy<Value = [u8; SHARED_SECRET_BYTES]> {
    prop::collection::vec(any::<u8>(), SHARED_SECRET_BYTES).prop_map(|v| {
        let mut out = [0u8; SHARED_SECRET_BYTES];
        out.copy_from_slice(&v);
        out
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_ratchet_is_deterministic(secret in shared_secret(), steps in 1usize..5) {
        let mut a = KeyManager::new();
        let mut b = KeyManager::new();

        for _ in 0..steps {
            a.new_ratchet(&secret).unwrap();
            b.new_ratchet(&secret).unwrap();
        }

        prop_assert_eq!(a.current().root_key(), b.current().root_key());
        prop_assert_eq!(a.current().chain_a().key(), b.current().chain_a().key());
        prop_assert_eq!(a.current().chain_b().key(), b.current().chain_b().key());
        prop_assert_eq!(a.ratchet_index(), steps as u32);
    }

    #[test]
    fn prop_ratchet_outputs_are_pairwise_distinct(secret in shared_secret()) {
        let mut manager = KeyManager::new();
        manager.new_ratchet(&secret).unwrap();

        let keys = manager.current();
        prop_assert_ne!(keys.root_key(), keys.chain_a().key());
        prop_assert_ne!(keys.root_key(), keys.chain_b().key());
        prop_assert_ne!(keys.chain_a().key(), keys.chain_b().key());
    }

    #[test]
    fn prop_each_step_rotates_all_keys(secret in shared_secret(), steps in 2usize..6) {
        let mut manager = KeyManager::new();
        manager.new_ratchet(&secret).unwrap();

        for _ in 1..steps {
            let root = *manager.current().root_key();
            let a = *manager.current().chain_a().key();
            let b = *manager.current().chain_b().key();

            manager.new_ratchet(&secret).unwrap();

            prop_assert_ne!(manager.current().root_key(), &root);
            prop_assert_ne!(manager.current().chain_a().key(), &a);
            prop_assert_ne!(manager.current().chain_b().key(), &b);
        }
    }

    #[test]
    fn prop_later_step_matches_manual_chaining(secret in shared_secret()) {
        let mut manager = KeyManager::new();
        manager.new_ratchet(&secret).unwrap();
        let previous_root = *manager.current().root_key();
        manager.new_ratchet(&secret).unwrap();

        let mut mixed = [0u8; SHARED_SECRET_BYTES];
        shake_kkdf(&previous_root, &secret, &mut mixed);
        let mut root = [0u8; 64];
        shake_256_kdf(0x01, &mixed, &mut root);

        prop_assert_eq!(manager.current().root_key(), &root);
    }

    #[test]
    fn prop_message_keys_never_repeat(secret in shared_secret(), count in 1usize..16) {
        let mut manager = KeyManager::new();
        manager.new_ratchet(&secret).unwrap();

        let mut seen = std::collections::HashSet::new();
        for expected_id in 0..count {
            let keys = manager.next_message_keys(Chain::A).unwrap();
            prop_assert_eq!(keys.message_id(), expected_id as u32);
            prop_assert!(seen.insert(*keys.encryption_key()));
        }
    }
}

proptest! {
    // finite-field exponentiation dominates; keep the case count low
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn prop_parties_agree(seed_a in any::<u64>(), seed_b in any::<u64>()) {
        prop_assume!(seed_a != seed_b);

        let mut alice = KeyManager::new();
        let mut bob = KeyManager::new();
        alice.generate_ephemeral_keys(&SeededEnv::new(seed_a)).unwrap();
        bob.generate_ephemeral_keys(&SeededEnv::new(seed_b)).unwrap();

        alice.set_their_keys(bob.our_ecdh().public(), bob.our_dh().public());
        bob.set_their_keys(alice.our_ecdh().public(), alice.our_dh().public());

        let k_alice = alice.derive_shared_secret().unwrap();
        let k_bob = bob.derive_shared_secret().unwrap();
        prop_assert_eq!(k_alice.as_bytes(), k_bob.as_bytes());

        alice.new_ratchet(k_alice.as_bytes()).unwrap();
        bob.new_ratchet(k_bob.as_bytes()).unwrap();

        let sent = alice.next_message_keys(Chain::A).unwrap();
        let received = bob.next_message_keys(Chain::A).unwrap();
        prop_assert_eq!(sent.encryption_key(), received.encryption_key());
        prop_assert_eq!(sent.mac_key(), received.mac_key());
    }
}
