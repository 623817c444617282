//! Received-value gate.
//!
//! Peer-supplied handshake material is accepted only if all of these hold:
//!
//! - the curve point lies on Curve448 (not the twist, not low order)
//! - the finite-field value is in the prime-order subgroup
//! - the profile signature verifies against its identity key
//! - the profile expires strictly after `now`
//! - the profile advertises only accepted version characters
//!
//! Every check runs on every call; the result lists each failure. Nothing
//! here mutates state, so a rejected message leaves the caller untouched.

use dake_crypto::{DhPublicKey, EcPoint};
use thiserror::Error;

use crate::profile::Profile;

/// One failed check of the gate.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    /// Curve point is off-curve, on the twist, or low order
    #[error("received curve point is not on curve448")]
    InvalidPoint,

    /// Finite-field value is not a subgroup member
    #[error("received finite-field value is not a subgroup member")]
    InvalidDhValue,

    /// Profile signature does not verify
    #[error("profile signature does not verify")]
    BadSignature,

    /// Profile has expired
    #[error("profile expired at {expires} (now {now})")]
    Expired {
        /// Profile expiry
        expires: u64,
        /// Time of the check
        now: u64,
    },

    /// Profile advertises an unrecognized version
    #[error("profile advertises unsupported versions")]
    RejectedVersions,
}

/// Result of running the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// All checks passed
    Accept,

    /// At least one check failed
    Reject {
        /// Every failed check, in evaluation order
        failures: Vec<ValidationFailure>,
    },
}

impl ValidationResult {
    /// True if all checks passed.
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Run every check and report the outcome.
///
/// Each failure is logged at `warn` as a possible attack or stale peer.
pub fn check_received_values(
    ecdh: &EcPoint,
    dh: &DhPublicKey,
    profile: &Profile,
    now: u64,
) -> ValidationResult {
    let checks = [
        (ecdh.is_valid(), ValidationFailure::InvalidPoint),
        (dh.is_valid(), ValidationFailure::InvalidDhValue),
        (profile.verify_signature(), ValidationFailure::BadSignature),
        (!profile.is_expired(now), ValidationFailure::Expired { expires: profile.expires(), now }),
        (profile.versions_accepted(), ValidationFailure::RejectedVersions),
    ];

    let failures: Vec<_> = checks
        .into_iter()
        .filter(|(passed, _)| !passed)
        .map(|(_, failure)| {
            tracing::warn!(%failure, "received value rejected");
            failure
        })
        .collect();

    if failures.is_empty() { ValidationResult::Accept } else { ValidationResult::Reject { failures } }
}

/// True if peer material passes every check.
pub fn valid_received_values(
    ecdh: &EcPoint,
    dh: &DhPublicKey,
    profile: &Profile,
    now: u64,
) -> bool {
    check_received_values(ecdh, dh, profile, now).is_accept()
}
