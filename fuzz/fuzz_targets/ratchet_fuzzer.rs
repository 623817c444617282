//! Fuzz target for the key manager state machine
//!
//! Drives a `KeyManager` through arbitrary sequences of ratchet steps,
//! message-key draws, peer key updates and destruction. Checks that the
//! ratchet index tracks successful steps and that destroy always leaves
//! every buffer zeroed.

#![no_main]

use arbitrary::Arbitrary;
use dake_crypto::{Chain, DhPublicKey, EcPoint, KeyManager};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Ratchet([u8; 64]),
    NextA,
    NextB,
    SetTheirKeys([u8; 56], Vec<u8>),
    DeriveShared,
    Destroy,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut manager = KeyManager::new();
    let mut expected_index = 0u32;

    for op in ops.into_iter().take(64) {
        match op {
            Op::Ratchet(secret) => {
                if manager.new_ratchet(&secret).is_ok() {
                    expected_index += 1;
                }
            },
            Op::NextA => {
                let _ = manager.next_message_keys(Chain::A);
            },
            Op::NextB => {
                let _ = manager.next_message_keys(Chain::B);
            },
            Op::SetTheirKeys(point, dh) => {
                let dh = DhPublicKey::from_bytes_be(&dh[..dh.len().min(384)]);
                manager.set_their_keys(&EcPoint::from_bytes(point), &dh);
            },
            Op::DeriveShared => {
                // No local ephemerals are ever generated here
                assert!(manager.derive_shared_secret().is_err());
            },
            Op::Destroy => {
                manager.destroy();
                expected_index = 0;
                assert!(manager.current().root_key().iter().all(|&b| b == 0));
                assert!(manager.brace_key().iter().all(|&b| b == 0));
                assert!(manager.their_ecdh().is_zero());
            },
        }
        assert_eq!(manager.ratchet_index(), expected_index);
    }
});
