//! Golden wire fixture for the Identity message
//!
//! Pins the exact bytes of one Identity message so that any change to the
//! header, profile, point or MPI encoding shows up as a diff against a known
//! vector rather than only as a round-trip failure.

use dake_crypto::{DhPublicKey, EcPoint};
use dake_proto::{DakeMessage, IdentityMessage, MessageType, Profile, ProtocolError};

const FIXTURE_HEX: &str = concat!(
    "0004080000000100000000002011111111111111111111111111111111111111",
    "111111111111111111111111110000000233340000000070dbd8802222222222",
    "2222222222222222222222222222222222222222222222222222222222222222",
    "2222222222222222222222222222222222222222222222222222220000000033",
    "3333333333333333333333333333333333333333333333333333333333333333",
    "333333333333333333333333333333333333333333333300000003010001",
);

fn fixture_profile() -> Profile {
    Profile::from_parts([0x11; 32], "34", 1_893_456_000, [0x22; 64], Vec::new())
}

fn fixture_message() -> IdentityMessage {
    let mut message = IdentityMessage::new(&fixture_profile());
    message.sender_tag = 0x0000_0001;
    message.receiver_tag = 0x0000_0000;
    message.y = EcPoint::from_bytes([0x33; 56]);
    message.b = DhPublicKey::from_bytes_be(&[0x01, 0x00, 0x01]);
    message
}

#[test]
fn identity_serializes_to_fixture() {
    let message = fixture_message();
    let bytes = message.serialize().expect("serialize should succeed");

    let profile_len = fixture_profile().serialized_len();
    assert_eq!(profile_len, 116);
    assert_eq!(bytes.len(), 11 + profile_len + 56 + (4 + 3));
    assert_eq!(&bytes[11..13], &dake_proto::ED25519_KEY_TYPE.to_be_bytes());
    assert_eq!(hex::encode(&bytes), FIXTURE_HEX);
}

#[test]
fn fixture_deserializes_to_fixture_fields() {
    let bytes = hex::decode(FIXTURE_HEX).expect("fixture is valid hex");
    let decoded = IdentityMessage::deserialize(&bytes).expect("fixture should decode");

    assert_eq!(decoded.sender_tag, 1);
    assert_eq!(decoded.receiver_tag, 0);
    assert_eq!(decoded.profile, fixture_profile());
    assert_eq!(decoded.y, EcPoint::from_bytes([0x33; 56]));
    assert_eq!(decoded.b, DhPublicKey::from_bytes_be(&[0x01, 0x00, 0x01]));
    assert_eq!(decoded, fixture_message());
}

#[test]
fn fixture_dispatches_as_identity() {
    let bytes = hex::decode(FIXTURE_HEX).expect("fixture is valid hex");
    let decoded = DakeMessage::deserialize(&bytes).expect("fixture should decode");

    assert_eq!(decoded.message_type(), MessageType::Identity);
    assert_eq!(decoded, DakeMessage::Identity(fixture_message()));
}

#[test]
fn fixture_with_foreign_version_is_rejected() {
    let mut bytes = hex::decode(FIXTURE_HEX).expect("fixture is valid hex");
    bytes[1] = 0x03;

    assert_eq!(IdentityMessage::deserialize(&bytes), Err(ProtocolError::UnsupportedVersion(3)));
}
