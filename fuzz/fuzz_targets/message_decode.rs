//! Fuzz target for handshake message decoding
//!
//! Feeds arbitrary bytes to the dispatching decoder and to every
//! kind-specific decoder to find:
//! - Panics on malformed length prefixes
//! - Reads past the end of the buffer
//! - Decodes that succeed but do not survive a re-encode
//!
//! The fuzzer should NEVER panic. All invalid inputs should return an error.

#![no_main]

use dake_proto::{
    AuthIMessage, AuthRMessage, DakeMessage, IdentityMessage, NonInteractiveAuthMessage,
    PrekeyMessage,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(message) = DakeMessage::deserialize(data) {
        // Re-encoding may differ from the input (MPI leading zeros) but must
        // decode back to the same message
        let encoded = message.serialize().expect("decoded message must re-encode");
        assert_eq!(DakeMessage::deserialize(&encoded).ok(), Some(message));
    }

    let _ = IdentityMessage::deserialize(data);
    let _ = AuthRMessage::deserialize(data);
    let _ = AuthIMessage::deserialize(data);
    let _ = PrekeyMessage::deserialize(data);
    let _ = NonInteractiveAuthMessage::deserialize(data);
});
