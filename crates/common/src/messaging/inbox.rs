//! Batch decryption of fetched messages
//!
//! Every message is decrypted on its own. A message that fails (unknown counterparty
//! key, bad hex, failed authentication, text that is not UTF-8) is logged and skipped;
//! it never stops the rest of the batch.

use serde::{Deserialize, Serialize};

use crate::crypto::{PublicKey, SecretKey, SecretError};
use crate::node::{GetMessagesResponse, MessageEntry};

use super::payload::{MessageExtraData, PayloadError};

/// A message of ours, decrypted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedMessage {
    #[serde(flatten)]
    pub extra: MessageExtraData,
    pub message: String,
    pub sender: String,
    pub recipient: String,
    pub tstamp_nanos: u64,
}

/// Why one message of a batch could not be decrypted
#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    #[error("bad payload: {0}")]
    Payload(#[from] PayloadError),
    #[error("bad counterparty key: {0}")]
    Counterparty(#[from] crate::crypto::KeyError),
    #[error("ciphertext is not hex: {0}")]
    CiphertextHex(#[from] hex::FromHexError),
    #[error(transparent)]
    Decrypt(#[from] SecretError),
    #[error("plaintext is not utf-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// Outcome of decrypting a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxReport {
    pub messages: Vec<DecryptedMessage>,
    /// Messages of ours that could not be decrypted
    pub skipped: usize,
    /// Messages without our extra data, sent by some other application
    pub ignored: usize,
}

/// Decrypt every message in `response` that belongs to this application
///
/// Output order follows the response, but nothing depends on it.
pub fn decrypt_inbox(secret_key: &SecretKey, response: &GetMessagesResponse) -> InboxReport {
    let mut report = InboxReport::default();

    for entry in response.contacts.iter().flat_map(|c| c.messages.iter()) {
        match decrypt_entry(secret_key, entry) {
            Ok(Some(message)) => report.messages.push(message),
            Ok(None) => report.ignored += 1,
            Err(e) => {
                tracing::warn!(
                    sender = %entry.sender_public_key,
                    recipient = %entry.recipient_public_key,
                    tstamp_nanos = entry.tstamp_nanos,
                    "skipping message: {}",
                    e
                );
                report.skipped += 1;
            }
        }
    }

    tracing::debug!(
        decrypted = report.messages.len(),
        skipped = report.skipped,
        ignored = report.ignored,
        "inbox decrypted"
    );

    report
}

/// Decrypt one message; `Ok(None)` if it carries no payload of ours
pub fn decrypt_entry(
    secret_key: &SecretKey,
    entry: &MessageEntry,
) -> Result<Option<DecryptedMessage>, InboxError> {
    let Some(extra_data) = &entry.extra_data else {
        return Ok(None);
    };
    let Some(extra) = MessageExtraData::from_extra_data(extra_data)? else {
        return Ok(None);
    };

    let counterparty = PublicKey::from_base58check(entry.counterparty())?;
    let key = secret_key.shared_key(&counterparty);
    let ciphertext = hex::decode(entry.encrypted_text.trim())?;
    let plaintext = key.decrypt(&ciphertext)?;

    Ok(Some(DecryptedMessage {
        extra,
        message: String::from_utf8(plaintext)?,
        sender: entry.sender_public_key.clone(),
        recipient: entry.recipient_public_key.clone(),
        tstamp_nanos: entry.tstamp_nanos,
    }))
}
