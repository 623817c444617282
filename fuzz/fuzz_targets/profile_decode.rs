//! Fuzz target for profile and field decoding
//!
//! Exercises the codec primitives directly so that length-prefix handling is
//! covered even when no message header is present.

#![no_main]

use dake_proto::{Profile, codec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((profile, nread)) = Profile::deserialize(data) {
        assert!(nread <= data.len());
        assert_eq!(nread, profile.serialized_len());

        // Gate checks must be total on any decoded profile
        let _ = profile.verify_signature();
        let _ = profile.versions_accepted();
    }

    let _ = codec::deserialize_mpi(data);
    let _ = codec::deserialize_data(data);
    let _ = codec::deserialize_dh_public_key(data);
    if let Ok((point, _)) = codec::deserialize_ec_point(data) {
        let _ = point.is_valid();
    }
});
