//! Per-conversation key agreement
//!
//! Both parties of a conversation reach the same key independently:
//!
//! 1. **Decode the counterparty**: base58check string → network prefix stripped → SEC1 point
//! 2. **ECDH**: multiply the point by our scalar and keep the x-coordinate
//! 3. **KDF**: stretch the x-coordinate into a 32-byte [`Secret`]
//!
//! Since `a · (b · G) == b · (a · G)`, Alice deriving against Bob's public key yields the
//! same [`Secret`] as Bob deriving against Alice's.

use super::keys::{KeyError, PublicKey, SecretKey};
use super::secret::Secret;

/// Errors that can occur while deriving a conversation key
#[derive(Debug, thiserror::Error)]
pub enum SharedKeyError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("invalid private key: {0}")]
    InvalidKey(String),
}

impl From<KeyError> for SharedKeyError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InvalidKey(msg) | KeyError::SigningFailed(msg) => {
                SharedKeyError::InvalidKey(msg)
            }
            KeyError::InvalidPublicKey(msg) | KeyError::InvalidSignature(msg) => {
                SharedKeyError::InvalidPublicKey(msg)
            }
        }
    }
}

/// Derive the symmetric key shared with the owner of `public_key_encoded`
///
/// # Arguments
///
/// * `public_key_encoded` - The counterparty's base58check public key
/// * `private_scalar_hex` - Our own private scalar as hex
///
/// # Errors
///
/// - `InvalidPublicKey` if the checksum fails, the payload is too short to strip the
///   network prefix, or the remainder is not a curve point
/// - `InvalidKey` if the scalar is not hex or not in `[1, n)`
pub fn derive_shared_key(
    public_key_encoded: &str,
    private_scalar_hex: &str,
) -> Result<Secret, SharedKeyError> {
    let counterparty = PublicKey::from_base58check(public_key_encoded)?;
    let secret_key = SecretKey::from_hex(private_scalar_hex)?;

    Ok(secret_key.shared_key(&counterparty))
}
