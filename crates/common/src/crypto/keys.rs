use std::fmt;
use std::str::FromStr;

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

use super::kdf;
use super::secret::Secret;

/// Size of a secp256k1 private scalar in bytes
pub const PRIVATE_KEY_SIZE: usize = 32;
/// Size of a compressed SEC1 public key in bytes
pub const PUBLIC_KEY_SIZE: usize = 33;
/// Size of the network prefix carried by base58check encoded public keys
pub const NETWORK_PREFIX_SIZE: usize = 3;
/// Size of the ECDH shared secret (the x-coordinate of the shared point)
pub const SHARED_SECRET_SIZE: usize = 32;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

/// Network a base58check public key belongs to
///
/// The decoded base58check payload starts with a 3-byte prefix naming the network,
/// followed by the compressed SEC1 point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub const fn prefix(&self) -> [u8; NETWORK_PREFIX_SIZE] {
        match self {
            Network::Mainnet => [0xcd, 0x14, 0x00],
            Network::Testnet => [0x11, 0xc2, 0x00],
        }
    }

    /// Look up the network a prefix belongs to, if it is one we know
    pub fn from_prefix(prefix: &[u8]) -> Option<Self> {
        [Network::Mainnet, Network::Testnet]
            .into_iter()
            .find(|network| network.prefix() == prefix)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = KeyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(KeyError::InvalidPublicKey(format!(
                "unknown network '{}'",
                other
            ))),
        }
    }
}

/// Public point on secp256k1
///
/// A thin wrapper around `k256::PublicKey`. Counterparties hand these to us either as raw
/// SEC1 bytes or as base58check strings carrying a network prefix.
///
/// # Examples
///
/// ```ignore
/// let public_key = PublicKey::from_base58check("BC1YL...")?;
/// let encoded = public_key.to_base58check(Network::Mainnet);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(k256::PublicKey);

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl From<k256::PublicKey> for PublicKey {
    fn from(key: k256::PublicKey) -> Self {
        PublicKey(key)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_sec1_bytes(bytes)
    }
}

impl PublicKey {
    /// Parse a SEC1 encoded point, compressed (33 bytes) or uncompressed (65 bytes)
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        k256::PublicKey::from_sec1_bytes(bytes)
            .map(PublicKey)
            .map_err(|_| {
                KeyError::InvalidPublicKey(format!("{} bytes are not a curve point", bytes.len()))
            })
    }

    /// Parse a public key from a hexadecimal SEC1 string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex)
            .map_err(|_| KeyError::InvalidPublicKey("public key hex decode error".into()))?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Decode a base58check public key
    ///
    /// The checksum is verified, then the network prefix is stripped and the remainder
    /// parsed as a SEC1 point. The prefix is not required to name a known network.
    pub fn from_base58check(encoded: &str) -> Result<Self, KeyError> {
        let payload = bs58::decode(encoded.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| KeyError::InvalidPublicKey(format!("base58check decode error: {}", e)))?;

        if payload.len() <= NETWORK_PREFIX_SIZE {
            return Err(KeyError::InvalidPublicKey(format!(
                "decoded payload too short, expected more than {} bytes, got {}",
                NETWORK_PREFIX_SIZE,
                payload.len()
            )));
        }

        let prefix = &payload[..NETWORK_PREFIX_SIZE];
        if Network::from_prefix(prefix).is_none() {
            tracing::debug!(prefix = %hex::encode(prefix), "public key has unknown network prefix");
        }

        Self::from_sec1_bytes(&payload[NETWORK_PREFIX_SIZE..])
    }

    /// Encode as base58check with the prefix of the given network
    pub fn to_base58check(&self, network: Network) -> String {
        let mut payload = Vec::with_capacity(NETWORK_PREFIX_SIZE + PUBLIC_KEY_SIZE);
        payload.extend_from_slice(&network.prefix());
        payload.extend_from_slice(&self.to_bytes());
        bs58::encode(payload).with_check().into_string()
    }

    /// Compressed SEC1 bytes
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_SIZE] {
        let mut out = [0u8; PUBLIC_KEY_SIZE];
        out.copy_from_slice(self.0.to_encoded_point(true).as_bytes());
        out
    }

    /// Compressed SEC1 bytes as a hexadecimal string
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Verify a DER encoded ECDSA signature over a 32-byte digest
    pub fn verify_digest(&self, digest: &[u8; 32], der_signature: &[u8]) -> Result<(), KeyError> {
        let signature = Signature::from_der(der_signature)
            .map_err(|_| KeyError::InvalidSignature("malformed DER encoding".into()))?;
        VerifyingKey::from(&self.0)
            .verify_prehash(digest, &signature)
            .map_err(|_| KeyError::InvalidSignature("verification failed".into()))
    }

    pub(crate) fn as_inner(&self) -> &k256::PublicKey {
        &self.0
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

/// The raw ECDH output: x-coordinate of `private · public`
///
/// Only lives for the duration of one key derivation and is zeroized on drop.
#[derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_SIZE]);

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_SIZE] {
        &self.0
    }

    /// Stretch the raw secret into a symmetric key
    pub fn derive_key(&self) -> Secret {
        kdf::derive_key(&self.0)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Private scalar on secp256k1
///
/// Always supplied by the caller, from hex or PEM. The library never generates one
/// and has no way to encode one back to text.
/// The inner `k256::SecretKey` is zeroized on drop, and `Debug` never prints the scalar.
///
/// # Examples
///
/// ```ignore
/// let secret_key = SecretKey::from_pem(&std::fs::read_to_string(key_file)?)?;
/// let public_key = secret_key.public();
/// ```
#[derive(Clone)]
pub struct SecretKey(k256::SecretKey);

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", self.public().to_hex())
    }
}

impl TryFrom<[u8; PRIVATE_KEY_SIZE]> for SecretKey {
    type Error = KeyError;
    fn try_from(bytes: [u8; PRIVATE_KEY_SIZE]) -> Result<Self, Self::Error> {
        Self::from_slice(&bytes)
    }
}

impl SecretKey {
    /// Parse a scalar from big-endian bytes
    ///
    /// Fails unless the slice is exactly 32 bytes and the scalar lies in `[1, n)`.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != PRIVATE_KEY_SIZE {
            return Err(KeyError::InvalidKey(format!(
                "invalid private key size, expected {}, got {}",
                PRIVATE_KEY_SIZE,
                bytes.len()
            )));
        }
        k256::SecretKey::from_slice(bytes)
            .map(SecretKey)
            .map_err(|_| KeyError::InvalidKey("scalar out of range".into()))
    }

    /// Parse a secret key from a hexadecimal string
    ///
    /// Accepts both plain hex and "0x"-prefixed hex strings.
    pub fn from_hex(hex: &str) -> Result<Self, KeyError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut buff = zeroize::Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        hex::decode_to_slice(hex, &mut buff[..])
            .map_err(|_| KeyError::InvalidKey("private key hex decode error".into()))?;
        Self::from_slice(&buff[..])
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.public_key())
    }

    /// Convert secret key to raw bytes
    pub fn to_bytes(&self) -> zeroize::Zeroizing<[u8; PRIVATE_KEY_SIZE]> {
        let mut out = zeroize::Zeroizing::new([0u8; PRIVATE_KEY_SIZE]);
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    /// Parse a secret key from PEM format, tag "PRIVATE KEY" around the raw 32-byte scalar
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The PEM string is malformed
    /// - The PEM tag is not "PRIVATE KEY"
    /// - The key size is incorrect or the scalar is out of range
    pub fn from_pem(pem_str: &str) -> Result<Self, KeyError> {
        let pem =
            pem::parse(pem_str).map_err(|e| KeyError::InvalidKey(format!("failed to parse PEM: {}", e)))?;

        if pem.tag() != "PRIVATE KEY" {
            return Err(KeyError::InvalidKey(
                "invalid PEM tag, expected PRIVATE KEY".into(),
            ));
        }

        Self::from_slice(pem.contents())
    }

    /// Sign a 32-byte digest with ECDSA and return the DER encoded signature.
    ///
    /// Nonces follow RFC 6979 and `s` is normalized to the low half of the order.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
        let signing_key = SigningKey::from(&self.0);
        let signature: Signature = signing_key
            .sign_prehash(digest)
            .map_err(|e| KeyError::SigningFailed(e.to_string()))?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    /// Elliptic-curve Diffie-Hellman with a counterparty public key
    pub fn shared_secret(&self, counterparty: &PublicKey) -> SharedSecret {
        let shared = k256::ecdh::diffie_hellman(
            self.0.to_nonzero_scalar(),
            counterparty.as_inner().as_affine(),
        );
        let mut out = [0u8; SHARED_SECRET_SIZE];
        out.copy_from_slice(shared.raw_secret_bytes());
        SharedSecret(out)
    }

    /// ECDH followed by the KDF, yielding the per-conversation symmetric key
    pub fn shared_key(&self, counterparty: &PublicKey) -> Secret {
        self.shared_secret(counterparty).derive_key()
    }
}
