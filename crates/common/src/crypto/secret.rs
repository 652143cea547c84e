//! Message encryption using ChaCha20-Poly1305
//!
//! A `Secret` is the symmetric key of one conversation. It is derived from ECDH on every
//! call rather than cached, and every message sealed under it carries its own random nonce.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of ChaCha20-Poly1305 nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of the Poly1305 authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Size of ChaCha20-Poly1305 key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("invalid secret size, expected {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
    /// Authentication failed: wrong key, tampered or truncated ciphertext.
    /// Recoverable; callers working through a batch skip the item and move on.
    #[error("decryption failed")]
    DecryptionFailed,
}

/// A 256-bit symmetric key for message encryption
///
/// The encrypted format is: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
/// Decryption needs nothing but the key and that byte string.
///
/// # Examples
///
/// ```ignore
/// let secret = secret_key.shared_key(&counterparty);
///
/// let ciphertext = secret.encrypt(b"gm")?;
/// let recovered = secret.decrypt(&ciphertext)?;
/// assert_eq!(b"gm", &recovered[..]);
/// ```
/// No `PartialEq`: compare [`Secret::bytes`] where needed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Create a secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SECRET_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        if data.len() != SECRET_SIZE {
            return Err(SecretError::InvalidSize {
                expected: SECRET_SIZE,
                actual: data.len(),
            });
        }
        let mut buff = [0; SECRET_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Parse a secret from a hexadecimal string
    pub fn from_hex(hex: &str) -> Result<Self, SecretError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = [0; SECRET_SIZE];
        hex::decode_to_slice(hex, &mut buff)
            .map_err(|e| SecretError::MalformedInput(format!("secret hex decode error: {}", e)))?;
        Ok(Self(buff))
    }

    /// Convert secret to hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Get a reference to the secret key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encrypt data using ChaCha20-Poly1305 AEAD
    ///
    /// A random nonce is generated for each call and prepended to the output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the system RNG fails.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        let key = Key::from_slice(self.bytes());
        let cipher = ChaCha20Poly1305::new(key);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| SecretError::EncryptionFailed(format!("failed to generate nonce: {}", e)))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|_| SecretError::EncryptionFailed("aead encrypt error".into()))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(ciphertext.as_ref());

        Ok(out)
    }

    /// Decrypt data using ChaCha20-Poly1305 AEAD
    ///
    /// Expects input in the format: `nonce (12 bytes) || ciphertext || auth_tag (16 bytes)`.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::DecryptionFailed` if the data is too short to hold a nonce and
    /// tag, or if authentication fails (wrong key or tampered data).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SecretError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(SecretError::DecryptionFailed);
        }

        let key = Key::from_slice(self.bytes());
        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        let cipher = ChaCha20Poly1305::new(key);
        cipher
            .decrypt(nonce, &data[NONCE_SIZE..])
            .map_err(|_| SecretError::DecryptionFailed)
    }
}

/// Encrypt a message under a conversation key
pub fn encrypt_message(key: &Secret, plaintext: &[u8]) -> Result<Vec<u8>, SecretError> {
    key.encrypt(plaintext)
}

/// Decrypt a message sealed with [`encrypt_message`]
pub fn decrypt_message(key: &Secret, ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
    key.decrypt(ciphertext)
}

#[cfg(test)]
mod test {
    use super::*;

    fn secret(fill: u8) -> Secret {
        Secret::from([fill; SECRET_SIZE])
    }

    #[test]
    fn test_secret_encrypt_decrypt() {
        let secret = secret(42);
        let data = b"hello world, this is a test message for encryption";

        let encrypted = secret.encrypt(data).unwrap();
        assert_eq!(encrypted.len(), NONCE_SIZE + data.len() + TAG_SIZE);

        let decrypted = secret.decrypt(&encrypted).unwrap();
        assert_eq!(data.as_slice(), decrypted.as_slice());
    }

    #[test]
    fn test_nonce_is_fresh_per_call() {
        let secret = secret(1);
        let a = secret.encrypt(b"same").unwrap();
        let b = secret.encrypt(b"same").unwrap();
        assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_secret_size_validation() {
        let too_short = [1u8; 16];
        let too_long = [1u8; 64];

        assert!(matches!(
            Secret::from_slice(&too_short),
            Err(SecretError::InvalidSize {
                expected: SECRET_SIZE,
                actual: 16
            })
        ));
        assert!(Secret::from_slice(&too_long).is_err());

        let just_right = [1u8; SECRET_SIZE];
        assert!(Secret::from_slice(&just_right).is_ok());
    }

    #[test]
    fn test_hex_roundtrip() {
        let secret = secret(0xab);
        assert_eq!(Secret::from_hex(&secret.to_hex()).unwrap().bytes(), secret.bytes());
        assert!(matches!(
            Secret::from_hex("zz"),
            Err(SecretError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_tamper_detection() {
        let secret = secret(9);
        let encrypted = secret.encrypt(b"test data for integrity check").unwrap();

        for index in [0, NONCE_SIZE, NONCE_SIZE + 10, encrypted.len() - 1] {
            let mut tampered = encrypted.clone();
            tampered[index] ^= 0x01;
            assert!(matches!(
                secret.decrypt(&tampered),
                Err(SecretError::DecryptionFailed)
            ));
        }
    }

    #[test]
    fn test_truncated_ciphertext() {
        let secret = secret(3);
        let encrypted = secret.encrypt(b"abc").unwrap();

        assert!(matches!(
            secret.decrypt(&encrypted[..NONCE_SIZE + TAG_SIZE - 1]),
            Err(SecretError::DecryptionFailed)
        ));
        assert!(matches!(
            secret.decrypt(&encrypted[..encrypted.len() - 1]),
            Err(SecretError::DecryptionFailed)
        ));
        assert!(secret.decrypt(&[]).is_err());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let encrypted = encrypt_message(&secret(1), b"for your eyes only").unwrap();
        assert!(matches!(
            decrypt_message(&secret(2), &encrypted),
            Err(SecretError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_empty_data_encryption() {
        let secret = secret(5);
        let encrypted = secret.encrypt(b"").unwrap();
        let decrypted = secret.decrypt(&encrypted).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        assert_eq!(format!("{:?}", secret(0x41)), "Secret(..)");
    }
}
