//! Transaction signing
//!
//! The node hands us transactions in their binary wire encoding, hex encoded. The last
//! byte of an unsigned transaction is a placeholder for the signature length field: it
//! is dropped, never read, and replaced by the real signature:
//!
//! ```text
//! unsigned: [ body: n-1 bytes ][ placeholder: 1 byte ]
//! signed:   [ body: n-1 bytes ][ uvarint(len(sig)) ][ sig: DER ]
//! ```
//!
//! The signature is ECDSA over `SHA-256(SHA-256(unsigned))`, placeholder included.

pub mod varint;

use sha2::{Digest, Sha256};

use crate::crypto::{KeyError, PublicKey, SecretKey};

use varint::{decode_uvarint, encode_uvarint};

/// Size of the double SHA-256 digest that gets signed
pub const DIGEST_SIZE: usize = 32;

/// Errors that can occur while signing a transaction
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("malformed transaction: {0}")]
    MalformedInput(String),
    #[error("invalid private key: {0}")]
    InvalidKey(KeyError),
    #[error("signing failed: {0}")]
    SigningFailed(String),
}

impl From<KeyError> for TransactionError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::SigningFailed(reason) => TransactionError::SigningFailed(reason),
            other => TransactionError::InvalidKey(other),
        }
    }
}

/// A transaction as built by the node, awaiting a signature
///
/// Never empty. The trailing byte is the signature length placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction(Vec<u8>);

impl TryFrom<Vec<u8>> for UnsignedTransaction {
    type Error = TransactionError;
    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl UnsignedTransaction {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TransactionError> {
        if bytes.is_empty() {
            return Err(TransactionError::MalformedInput(
                "transaction is empty".into(),
            ));
        }
        Ok(Self(bytes))
    }

    /// Parse a transaction from a hexadecimal string
    pub fn from_hex(hex: &str) -> Result<Self, TransactionError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let bytes = hex::decode(hex)
            .map_err(|e| TransactionError::MalformedInput(format!("hex decode error: {}", e)))?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Everything before the placeholder byte; empty for a one-byte transaction
    pub fn prefix(&self) -> &[u8] {
        &self.0[..self.0.len() - 1]
    }

    /// `SHA-256(SHA-256(bytes))` over the whole transaction
    pub fn digest(&self) -> [u8; DIGEST_SIZE] {
        let once = Sha256::digest(&self.0);
        Sha256::digest(once).into()
    }

    /// Sign the transaction and splice the signature in place of the placeholder
    pub fn sign(&self, secret_key: &SecretKey) -> Result<SignedTransaction, TransactionError> {
        let digest = self.digest();
        let signature = secret_key.sign_digest(&digest)?;
        let length = encode_uvarint(signature.len() as u64);

        let prefix = self.prefix();
        let mut bytes = Vec::with_capacity(prefix.len() + length.len() + signature.len());
        bytes.extend_from_slice(prefix);
        bytes.extend_from_slice(&length);
        bytes.extend_from_slice(&signature);

        tracing::debug!(
            transaction_len = self.0.len(),
            signature_len = signature.len(),
            "signed transaction"
        );

        Ok(SignedTransaction {
            bytes,
            prefix_len: prefix.len(),
            signature_offset: prefix.len() + length.len(),
        })
    }
}

/// A transaction carrying its DER signature, ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    bytes: Vec<u8>,
    prefix_len: usize,
    signature_offset: usize,
}

impl SignedTransaction {
    /// Split signed bytes back into their parts, given the length of the unsigned body
    ///
    /// Fails unless a minimal varint follows the body and the signature after it has
    /// exactly the announced length.
    pub fn parse(bytes: Vec<u8>, prefix_len: usize) -> Result<Self, TransactionError> {
        let rest = bytes.get(prefix_len..).ok_or_else(|| {
            TransactionError::MalformedInput("signed transaction shorter than its body".into())
        })?;
        let (length, consumed) = decode_uvarint(rest).ok_or_else(|| {
            TransactionError::MalformedInput("bad signature length varint".into())
        })?;
        let signature_offset = prefix_len + consumed;
        if (bytes.len() - signature_offset) as u64 != length {
            return Err(TransactionError::MalformedInput(format!(
                "signature length mismatch, announced {}, found {}",
                length,
                bytes.len() - signature_offset
            )));
        }
        Ok(Self {
            bytes,
            prefix_len,
            signature_offset,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    /// The unsigned transaction body, byte-identical to the original minus its placeholder
    pub fn prefix(&self) -> &[u8] {
        &self.bytes[..self.prefix_len]
    }

    pub fn signature_der(&self) -> &[u8] {
        &self.bytes[self.signature_offset..]
    }

    /// Check the embedded signature against `public_key` and the transaction it signs
    pub fn verify(
        &self,
        unsigned: &UnsignedTransaction,
        public_key: &PublicKey,
    ) -> Result<(), KeyError> {
        if unsigned.prefix() != self.prefix() {
            return Err(KeyError::InvalidSignature(
                "signed body differs from the unsigned transaction".into(),
            ));
        }
        public_key.verify_digest(&unsigned.digest(), self.signature_der())
    }
}

/// Sign a hex encoded transaction with a hex encoded private scalar
///
/// # Errors
///
/// - `MalformedInput` if the transaction is not hex or is empty
/// - `InvalidKey` if the scalar is not hex or not in `[1, n)`
/// - `SigningFailed` if the ECDSA backend reports an error
pub fn sign_transaction(
    private_scalar_hex: &str,
    unsigned_transaction_hex: &str,
) -> Result<String, TransactionError> {
    let unsigned = UnsignedTransaction::from_hex(unsigned_transaction_hex)?;
    let secret_key = SecretKey::from_hex(private_scalar_hex)?;
    Ok(unsigned.sign(&secret_key)?.to_hex())
}
