//! Cryptographic primitives for sahara
//!
//! This module provides the two pieces of cryptography the rest of the crate relies on:
//!
//! - **Key material**: secp256k1 `SecretKey`/`PublicKey` wrappers. Secret keys are only
//!   ever parsed (hex or PEM), public keys round-trip through hex and base58check. ECDSA
//!   signing works over a prehashed digest
//! - **Conversation keys**: ECDH between our scalar and a counterparty point, stretched
//!   through a concatenation KDF into a 32-byte `Secret`
//! - **Message encryption**: ChaCha20-Poly1305 under that `Secret`, with a fresh nonce
//!   carried in front of every ciphertext
//!
//! # Security Model
//!
//! Key material is always supplied by the caller and passed into pure functions. Nothing
//! here stores keys, and nothing here logs them: the `Debug` impls of `SecretKey`,
//! `SharedSecret` and `Secret` are redacted, and the byte buffers are zeroized on drop.
//!
//! The conversation key is recomputed for every call. Any ciphertext that fails
//! authentication surfaces as `SecretError::DecryptionFailed`.

mod kdf;
mod keys;
mod secret;
mod shared_key;

pub use kdf::{derive_key, kdf};
pub use keys::{
    KeyError, Network, PublicKey, SecretKey, SharedSecret, NETWORK_PREFIX_SIZE,
    PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE, SHARED_SECRET_SIZE,
};
pub use secret::{
    decrypt_message, encrypt_message, Secret, SecretError, NONCE_SIZE, SECRET_SIZE, TAG_SIZE,
};
pub use shared_key::{derive_shared_key, SharedKeyError};
