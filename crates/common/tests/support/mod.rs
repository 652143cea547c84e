//! Shared test utilities for the sahara integration tests
#![allow(dead_code)]

use common::crypto::{Network, SecretKey};
use common::messaging::{Identity, MessageExtraData};
use common::node::MessageEntry;

/// Private scalar used wherever a test needs a known, fixed key
pub const TEST_SCALAR_HEX: &str =
    "b71c71a67e1177ad4e901695e1b4b9ee17ae16c6668d313eac2f96dbcda3f291";

/// Generate a fresh secret key from the system RNG
pub fn random_secret_key() -> SecretKey {
    loop {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes).unwrap();
        if let Ok(key) = SecretKey::from_slice(&bytes) {
            return key;
        }
    }
}

/// A random identity on mainnet, along with its base58check public key
pub fn random_identity() -> (Identity, String) {
    let identity = Identity::new(random_secret_key(), Network::Mainnet);
    let encoded = identity.public_key_base58check();
    (identity, encoded)
}

/// A message entry as the node would return it, sealed from `from` to `to`
pub fn sealed_entry(
    from: &Identity,
    to: &Identity,
    extra: Option<&MessageExtraData>,
    text: &str,
) -> MessageEntry {
    let key = from.secret_key().shared_key(&to.public_key());
    MessageEntry {
        sender_public_key: from.public_key_base58check(),
        recipient_public_key: to.public_key_base58check(),
        encrypted_text: hex::encode(key.encrypt(text.as_bytes()).unwrap()),
        tstamp_nanos: 1_700_000_000_000_000_000,
        is_sender: false,
        extra_data: extra.map(MessageExtraData::to_extra_data),
    }
}
