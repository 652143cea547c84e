use serde::{Deserialize, Serialize};

use crate::crypto::{KeyError, Network, PublicKey, SecretError, SecretKey};
use crate::node::{
    AuthorizeDerivedKeyRequest, GetMessagesRequest, NodeClient, SendMessageRequest,
    SubmitTransactionRequest, DEFAULT_MIN_FEE_RATE_NANOS_PER_KB, DEFAULT_NUM_TO_FETCH,
};
use crate::transaction::{TransactionError, UnsignedTransaction};

use super::inbox::{decrypt_inbox, InboxReport};
use super::payload::MessageExtraData;

/// Whose keys a [`Messenger`] acts with
///
/// Built explicitly by the caller; never read from the process environment.
#[derive(Debug, Clone)]
pub struct Identity {
    secret_key: SecretKey,
    network: Network,
}

impl Identity {
    pub fn new(secret_key: SecretKey, network: Network) -> Self {
        Self {
            secret_key,
            network,
        }
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret_key.public()
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Our public key in the node's base58check form
    pub fn public_key_base58check(&self) -> String {
        self.public_key().to_base58check(self.network)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessengerConfig {
    pub min_fee_rate_nanos_per_kb: u64,
    pub num_to_fetch: u64,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            min_fee_rate_nanos_per_kb: DEFAULT_MIN_FEE_RATE_NANOS_PER_KB,
            num_to_fetch: DEFAULT_NUM_TO_FETCH,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MessengerError<E: std::error::Error + Send + Sync + 'static> {
    #[error("node error: {0}")]
    Node(#[source] E),
    #[error("bad recipient: {0}")]
    Recipient(#[source] KeyError),
    #[error("encryption failed: {0}")]
    Encrypt(#[source] SecretError),
    #[error("transaction error: {0}")]
    Transaction(#[source] TransactionError),
}

/// A message that made it on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    #[serde(flatten)]
    pub extra: MessageExtraData,
    pub message: String,
    pub sender: String,
    pub recipient: String,
    #[serde(rename = "TxnHashHex")]
    pub txn_hash_hex: String,
}

/// The owner's grant for a derived key, produced outside this crate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedKeyGrant {
    /// Block height after which the derived key stops being valid
    pub expiration_block: u64,
    /// Owner's signature over the derived key and its limits, hex encoded
    pub access_signature: String,
    /// Encoded spending limits, hex encoded
    pub transaction_spending_limit_hex: String,
}

/// A derived key whose authorization made it on chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedKey {
    pub owner: String,
    pub derived: String,
    pub expiration_block: u64,
    #[serde(rename = "TxnHashHex")]
    pub txn_hash_hex: String,
}

/// Sends and receives encrypted direct messages through a node
///
/// Every call derives the conversation key afresh; nothing is cached between calls.
pub struct Messenger<C: NodeClient> {
    identity: Identity,
    config: MessengerConfig,
    client: C,
}

impl<C: NodeClient> Messenger<C> {
    pub fn new(identity: Identity, config: MessengerConfig, client: C) -> Self {
        Self {
            identity,
            config,
            client,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Encrypt `text` for `recipient`, have the node wrap it in a transaction, sign that
    /// transaction and submit it.
    ///
    /// Any failure aborts the send and is returned as is; nothing is retried.
    pub async fn send_message(
        &self,
        extra: MessageExtraData,
        text: &str,
        recipient: &str,
    ) -> Result<SentMessage, MessengerError<C::Error>> {
        let recipient_key =
            PublicKey::from_base58check(recipient).map_err(MessengerError::Recipient)?;
        let key = self.identity.secret_key.shared_key(&recipient_key);
        let ciphertext = key
            .encrypt(text.as_bytes())
            .map_err(MessengerError::Encrypt)?;

        let sender = self.identity.public_key_base58check();
        let request = SendMessageRequest {
            sender_public_key: sender.clone(),
            recipient_public_key: recipient.to_string(),
            encrypted_message_text: hex::encode(ciphertext),
            min_fee_rate_nanos_per_kb: self.config.min_fee_rate_nanos_per_kb,
            extra_data: extra.to_extra_data(),
        };
        let built = self
            .client
            .build_send_message(request)
            .await
            .map_err(MessengerError::Node)?;

        let unsigned = UnsignedTransaction::from_hex(&built.transaction_hex)
            .map_err(MessengerError::Transaction)?;
        let signed = unsigned
            .sign(&self.identity.secret_key)
            .map_err(MessengerError::Transaction)?;

        let submitted = self
            .client
            .submit_transaction(SubmitTransactionRequest {
                transaction_hex: signed.to_hex(),
            })
            .await
            .map_err(MessengerError::Node)?;

        tracing::info!(
            message_id = %extra.message_id,
            txn_hash = %submitted.txn_hash_hex,
            "message submitted"
        );

        Ok(SentMessage {
            extra,
            message: text.to_string(),
            sender,
            recipient: recipient.to_string(),
            txn_hash_hex: submitted.txn_hash_hex,
        })
    }

    /// Authorize `derived` to sign on behalf of this identity
    ///
    /// The node builds the authorization transaction; it is signed with the derived key,
    /// never with ours, then submitted.
    pub async fn authorize_derived_key(
        &self,
        derived: &SecretKey,
        grant: DerivedKeyGrant,
    ) -> Result<AuthorizedKey, MessengerError<C::Error>> {
        let owner = self.identity.public_key_base58check();
        let derived_public_key = derived.public().to_base58check(self.identity.network);

        let request = AuthorizeDerivedKeyRequest {
            owner_public_key: owner.clone(),
            derived_public_key: derived_public_key.clone(),
            derived_key_signature: true,
            expiration_block: grant.expiration_block,
            access_signature: grant.access_signature,
            delete_key: false,
            min_fee_rate_nanos_per_kb: self.config.min_fee_rate_nanos_per_kb,
            transaction_spending_limit_hex: grant.transaction_spending_limit_hex,
        };
        let built = self
            .client
            .build_authorize_derived_key(request)
            .await
            .map_err(MessengerError::Node)?;

        let signed = UnsignedTransaction::from_hex(&built.transaction_hex)
            .and_then(|unsigned| unsigned.sign(derived))
            .map_err(MessengerError::Transaction)?;

        let submitted = self
            .client
            .submit_transaction(SubmitTransactionRequest {
                transaction_hex: signed.to_hex(),
            })
            .await
            .map_err(MessengerError::Node)?;

        tracing::info!(
            derived = %derived_public_key,
            expiration_block = grant.expiration_block,
            txn_hash = %submitted.txn_hash_hex,
            "derived key authorized"
        );

        Ok(AuthorizedKey {
            owner,
            derived: derived_public_key,
            expiration_block: grant.expiration_block,
            txn_hash_hex: submitted.txn_hash_hex,
        })
    }

    /// Fetch our message history and decrypt what belongs to this application
    ///
    /// Only the fetch itself can fail; undecryptable messages are counted in
    /// [`InboxReport::skipped`].
    pub async fn fetch_messages(&self) -> Result<InboxReport, MessengerError<C::Error>> {
        let request = GetMessagesRequest::latest(
            self.identity.public_key_base58check(),
            self.config.num_to_fetch,
        );
        let response = self
            .client
            .get_messages(request)
            .await
            .map_err(MessengerError::Node)?;

        Ok(decrypt_inbox(&self.identity.secret_key, &response))
    }
}
