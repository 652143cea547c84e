//! Integration tests for conversation keys and message encryption

mod support;

use std::thread;

use common::crypto::{
    decrypt_message, derive_shared_key, encrypt_message, Network, Secret, SecretError,
    NONCE_SIZE, TAG_SIZE,
};

#[test]
fn test_ecdh_agreement_across_many_pairs() {
    for _ in 0..16 {
        let alice = support::random_secret_key();
        let bob = support::random_secret_key();

        let alice_pub = alice.public().to_base58check(Network::Mainnet);
        let bob_pub = bob.public().to_base58check(Network::Mainnet);

        let from_bob = derive_shared_key(&alice_pub, &hex::encode(&bob.to_bytes()[..])).unwrap();
        let from_alice = derive_shared_key(&bob_pub, &hex::encode(&alice.to_bytes()[..])).unwrap();
        assert_eq!(from_bob.bytes(), from_alice.bytes());
    }
}

#[test]
fn test_distinct_conversations_get_distinct_keys() {
    let alice = support::random_secret_key();
    let bob = support::random_secret_key().public();
    let carol = support::random_secret_key().public();

    assert_ne!(
        alice.shared_key(&bob).bytes(),
        alice.shared_key(&carol).bytes()
    );
}

#[test]
fn test_message_roundtrip_between_parties() {
    let alice = support::random_secret_key();
    let bob = support::random_secret_key();

    let sealed = encrypt_message(&alice.shared_key(&bob.public()), "gm ☀️".as_bytes()).unwrap();
    let opened = decrypt_message(&bob.shared_key(&alice.public()), &sealed).unwrap();
    assert_eq!(String::from_utf8(opened).unwrap(), "gm ☀️");
}

#[test]
fn test_roundtrip_various_sizes() {
    let key = support::random_secret_key().shared_key(&support::random_secret_key().public());
    for len in [0usize, 1, 15, 16, 17, 64, 4096] {
        let plaintext = vec![0x5au8; len];
        let sealed = encrypt_message(&key, &plaintext).unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + len + TAG_SIZE);
        assert_eq!(decrypt_message(&key, &sealed).unwrap(), plaintext);
    }
}

#[test]
fn test_every_bit_flip_is_detected() {
    let key = Secret::from([0x24; 32]);
    let sealed = encrypt_message(&key, b"short note").unwrap();

    for byte in 0..sealed.len() {
        for bit in 0..8 {
            let mut tampered = sealed.clone();
            tampered[byte] ^= 1 << bit;
            assert!(
                matches!(
                    decrypt_message(&key, &tampered),
                    Err(SecretError::DecryptionFailed)
                ),
                "flip of byte {} bit {} went unnoticed",
                byte,
                bit
            );
        }
    }
}

#[test]
fn test_wrong_key_rejected() {
    let alice = support::random_secret_key();
    let bob = support::random_secret_key();
    let eve = support::random_secret_key();

    let sealed = encrypt_message(&alice.shared_key(&bob.public()), b"meet at noon").unwrap();
    assert!(matches!(
        decrypt_message(&eve.shared_key(&alice.public()), &sealed),
        Err(SecretError::DecryptionFailed)
    ));
}

#[test]
fn test_concurrent_use_is_independent() {
    let alice = support::random_secret_key();
    let bob = support::random_secret_key();
    let key = alice.shared_key(&bob.public());

    let sealed: Vec<Vec<u8>> = (0..8)
        .map(|i| encrypt_message(&key, format!("message {}", i).as_bytes()).unwrap())
        .collect();

    thread::scope(|scope| {
        let handles: Vec<_> = sealed
            .iter()
            .enumerate()
            .map(|(i, ciphertext)| {
                let bob = &bob;
                let alice_pub = alice.public();
                scope.spawn(move || {
                    let key = bob.shared_key(&alice_pub);
                    let opened = decrypt_message(&key, ciphertext).unwrap();
                    assert_eq!(opened, format!("message {}", i).into_bytes());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    });
}
