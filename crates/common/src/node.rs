//! The remote node, as seen from this crate
//!
//! The node builds unsigned transactions, accepts signed ones and serves the message
//! history. Talking to it over HTTP is the job of whoever implements [`NodeClient`];
//! the request and response structs below mirror the node's JSON field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fee rate used when the caller does not choose one
pub const DEFAULT_MIN_FEE_RATE_NANOS_PER_KB: u64 = 1000;
/// Number of messages fetched per request when the caller does not choose one
pub const DEFAULT_NUM_TO_FETCH: u64 = 1000;

/// Ask the node to build an unsigned private message transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "SenderPublicKeyBase58Check")]
    pub sender_public_key: String,
    #[serde(rename = "RecipientPublicKeyBase58Check")]
    pub recipient_public_key: String,
    /// Hex encoded ciphertext
    #[serde(rename = "EncryptedMessageText")]
    pub encrypted_message_text: String,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    pub min_fee_rate_nanos_per_kb: u64,
    #[serde(rename = "ExtraData", default)]
    pub extra_data: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Hex encoded unsigned transaction
    #[serde(rename = "TransactionHex")]
    pub transaction_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionRequest {
    /// Hex encoded signed transaction
    #[serde(rename = "TransactionHex")]
    pub transaction_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitTransactionResponse {
    #[serde(rename = "TxnHashHex")]
    pub txn_hash_hex: String,
}

/// Ask the node to build a transaction letting a derived key sign for its owner
///
/// The returned transaction must be signed by the derived key, not the owner's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeDerivedKeyRequest {
    #[serde(rename = "OwnerPublicKeyBase58Check")]
    pub owner_public_key: String,
    #[serde(rename = "DerivedPublicKeyBase58Check")]
    pub derived_public_key: String,
    /// The transaction is signed by the derived key
    #[serde(rename = "DerivedKeySignature")]
    pub derived_key_signature: bool,
    /// Block height after which the derived key stops being valid
    #[serde(rename = "ExpirationBlock")]
    pub expiration_block: u64,
    /// Owner's signature over the derived key and its limits, hex encoded
    #[serde(rename = "AccessSignature")]
    pub access_signature: String,
    #[serde(rename = "DeleteKey", default)]
    pub delete_key: bool,
    #[serde(rename = "MinFeeRateNanosPerKB")]
    pub min_fee_rate_nanos_per_kb: u64,
    #[serde(rename = "TransactionSpendingLimitHex", default)]
    pub transaction_spending_limit_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizeDerivedKeyResponse {
    /// Hex encoded unsigned transaction
    #[serde(rename = "TransactionHex")]
    pub transaction_hex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMessagesRequest {
    #[serde(rename = "PublicKeyBase58Check")]
    pub public_key: String,
    #[serde(rename = "FetchAfterPublicKeyBase58Check", default)]
    pub fetch_after_public_key: String,
    #[serde(rename = "NumToFetch")]
    pub num_to_fetch: u64,
    #[serde(rename = "HoldersOnly", default)]
    pub holders_only: bool,
    #[serde(rename = "HoldingsOnly", default)]
    pub holdings_only: bool,
    #[serde(rename = "FollowersOnly", default)]
    pub followers_only: bool,
    #[serde(rename = "FollowingOnly", default)]
    pub following_only: bool,
    #[serde(rename = "SortAlgorithm")]
    pub sort_algorithm: String,
}

impl GetMessagesRequest {
    /// Most recent conversations of `public_key` first
    pub fn latest(public_key: String, num_to_fetch: u64) -> Self {
        Self {
            public_key,
            fetch_after_public_key: String::new(),
            num_to_fetch,
            holders_only: false,
            holdings_only: false,
            followers_only: false,
            following_only: false,
            sort_algorithm: "time".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetMessagesResponse {
    #[serde(rename = "OrderedContactsWithMessages", default)]
    pub contacts: Vec<ContactWithMessages>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactWithMessages {
    #[serde(rename = "PublicKeyBase58Check", default)]
    pub public_key: String,
    #[serde(rename = "Messages", default)]
    pub messages: Vec<MessageEntry>,
}

/// One message as stored on chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntry {
    #[serde(rename = "SenderPublicKeyBase58Check")]
    pub sender_public_key: String,
    #[serde(rename = "RecipientPublicKeyBase58Check")]
    pub recipient_public_key: String,
    /// Hex encoded ciphertext
    #[serde(rename = "EncryptedText")]
    pub encrypted_text: String,
    #[serde(rename = "TstampNanos", default)]
    pub tstamp_nanos: u64,
    /// True when the queried public key sent this message
    #[serde(rename = "IsSender", default)]
    pub is_sender: bool,
    #[serde(rename = "ExtraData", default)]
    pub extra_data: Option<BTreeMap<String, String>>,
}

impl MessageEntry {
    /// The other party of the conversation, from the point of view of the queried key
    pub fn counterparty(&self) -> &str {
        if self.is_sender {
            &self.recipient_public_key
        } else {
            &self.sender_public_key
        }
    }
}

/// Remote node operations this crate needs
///
/// Implementations own transport, serialization and any retry policy. Errors are
/// reported, never recovered, by everything in this crate.
#[async_trait::async_trait]
pub trait NodeClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build an unsigned transaction carrying an encrypted message
    async fn build_send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, Self::Error>;

    /// Build an unsigned transaction authorizing a derived key
    async fn build_authorize_derived_key(
        &self,
        request: AuthorizeDerivedKeyRequest,
    ) -> Result<AuthorizeDerivedKeyResponse, Self::Error>;

    /// Broadcast a signed transaction
    async fn submit_transaction(
        &self,
        request: SubmitTransactionRequest,
    ) -> Result<SubmitTransactionResponse, Self::Error>;

    /// Fetch the message history of a public key
    async fn get_messages(
        &self,
        request: GetMessagesRequest,
    ) -> Result<GetMessagesResponse, Self::Error>;
}
