//! Integration tests for the messenger against an in-memory node

mod support;

use std::sync::Mutex;

use common::crypto::PublicKey;
use common::messaging::{
    DerivedKeyGrant, MessageExtraData, Messenger, MessengerConfig, MessengerError,
};
use common::node::{
    AuthorizeDerivedKeyRequest, AuthorizeDerivedKeyResponse, ContactWithMessages,
    GetMessagesRequest, GetMessagesResponse, MessageEntry, NodeClient,
    SendMessageRequest, SendMessageResponse, SubmitTransactionRequest,
    SubmitTransactionResponse,
};
use common::transaction::{SignedTransaction, UnsignedTransaction};

const UNSIGNED_TX_HEX: &str = "0a0b0c00";

#[derive(Debug, thiserror::Error)]
#[error("node unavailable")]
struct NodeDown;

/// Node stand-in: builds a fixed transaction and records what it is sent
#[derive(Default)]
struct MemoryNode {
    down: bool,
    sent: Mutex<Vec<SendMessageRequest>>,
    authorizations: Mutex<Vec<AuthorizeDerivedKeyRequest>>,
    submitted: Mutex<Vec<String>>,
    inbox: Mutex<Vec<MessageEntry>>,
    queried: Mutex<Vec<GetMessagesRequest>>,
}

#[async_trait::async_trait]
impl NodeClient for MemoryNode {
    type Error = NodeDown;

    async fn build_send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, Self::Error> {
        if self.down {
            return Err(NodeDown);
        }
        self.sent.lock().unwrap().push(request);
        Ok(SendMessageResponse {
            transaction_hex: UNSIGNED_TX_HEX.to_string(),
        })
    }

    async fn build_authorize_derived_key(
        &self,
        request: AuthorizeDerivedKeyRequest,
    ) -> Result<AuthorizeDerivedKeyResponse, Self::Error> {
        if self.down {
            return Err(NodeDown);
        }
        self.authorizations.lock().unwrap().push(request);
        Ok(AuthorizeDerivedKeyResponse {
            transaction_hex: UNSIGNED_TX_HEX.to_string(),
        })
    }

    async fn submit_transaction(
        &self,
        request: SubmitTransactionRequest,
    ) -> Result<SubmitTransactionResponse, Self::Error> {
        self.submitted
            .lock()
            .unwrap()
            .push(request.transaction_hex);
        Ok(SubmitTransactionResponse {
            txn_hash_hex: "cafe".to_string(),
        })
    }

    async fn get_messages(
        &self,
        request: GetMessagesRequest,
    ) -> Result<GetMessagesResponse, Self::Error> {
        if self.down {
            return Err(NodeDown);
        }
        self.queried.lock().unwrap().push(request);
        Ok(GetMessagesResponse {
            contacts: vec![ContactWithMessages {
                public_key: String::new(),
                messages: self.inbox.lock().unwrap().clone(),
            }],
        })
    }
}

#[tokio::test]
async fn test_send_message_signs_and_submits() {
    let (alice, _) = support::random_identity();
    let (bob, bob_pub) = support::random_identity();
    let alice_key = alice.public_key();

    let messenger = Messenger::new(alice, MessengerConfig::default(), MemoryNode::default());
    let extra = MessageExtraData::post("c1", "general", "m1");

    let sent = messenger
        .send_message(extra.clone(), "hello bob", &bob_pub)
        .await
        .unwrap();
    assert_eq!(sent.txn_hash_hex, "cafe");
    assert_eq!(sent.extra, extra);
    assert_eq!(sent.recipient, bob_pub);

    let node = messenger.client();
    let request = node.sent.lock().unwrap()[0].clone();
    assert_eq!(request.min_fee_rate_nanos_per_kb, 1000);
    assert_eq!(request.extra_data, extra.to_extra_data());
    assert_eq!(
        PublicKey::from_base58check(&request.sender_public_key).unwrap(),
        alice_key
    );

    // the recipient can read what was sent
    let ciphertext = hex::decode(&request.encrypted_message_text).unwrap();
    let opened = bob.secret_key().shared_key(&alice_key).decrypt(&ciphertext).unwrap();
    assert_eq!(opened, b"hello bob");

    // the submitted transaction is the node's transaction, signed by alice
    let submitted = hex::decode(&node.submitted.lock().unwrap()[0]).unwrap();
    let unsigned = UnsignedTransaction::from_hex(UNSIGNED_TX_HEX).unwrap();
    let signed = SignedTransaction::parse(submitted, unsigned.prefix().len()).unwrap();
    assert_eq!(signed.prefix(), &[0x0a, 0x0b, 0x0c]);
    signed.verify(&unsigned, &alice_key).unwrap();
}

#[tokio::test]
async fn test_send_message_rejects_bad_recipient() {
    let (alice, _) = support::random_identity();
    let messenger = Messenger::new(alice, MessengerConfig::default(), MemoryNode::default());

    let err = messenger
        .send_message(MessageExtraData::post("c1", "general", "m1"), "hi", "garbage")
        .await
        .unwrap_err();
    assert!(matches!(err, MessengerError::Recipient(_)));
    assert!(messenger.client().sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_node_errors_surface() {
    let (alice, _) = support::random_identity();
    let (_, bob_pub) = support::random_identity();
    let node = MemoryNode {
        down: true,
        ..Default::default()
    };
    let messenger = Messenger::new(alice, MessengerConfig::default(), node);

    let err = messenger
        .send_message(MessageExtraData::post("c1", "general", "m1"), "hi", &bob_pub)
        .await
        .unwrap_err();
    assert!(matches!(err, MessengerError::Node(NodeDown)));

    let err = messenger.fetch_messages().await.unwrap_err();
    assert!(matches!(err, MessengerError::Node(NodeDown)));
}

#[tokio::test]
async fn test_fetch_messages_skips_failures() {
    let (alice, alice_pub) = support::random_identity();
    let (bob, _) = support::random_identity();
    let extra = MessageExtraData::post("c1", "general", "m1");

    let good = support::sealed_entry(&bob, &alice, Some(&extra), "readable");
    let mut bad = support::sealed_entry(&bob, &alice, Some(&extra), "unreadable");
    bad.encrypted_text = hex::encode([0u8; 40]);

    let node = MemoryNode::default();
    node.inbox.lock().unwrap().extend([bad, good]);

    let config = MessengerConfig {
        num_to_fetch: 50,
        ..Default::default()
    };
    let messenger = Messenger::new(alice, config, node);
    let report = messenger.fetch_messages().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.messages.len(), 1);
    assert_eq!(report.messages[0].message, "readable");

    let query = messenger.client().queried.lock().unwrap()[0].clone();
    assert_eq!(query.public_key, alice_pub);
    assert_eq!(query.num_to_fetch, 50);
    assert_eq!(query.sort_algorithm, "time");
}

#[tokio::test]
async fn test_authorize_derived_key_signs_with_derived_key() {
    let (owner, owner_pub) = support::random_identity();
    let owner_key = owner.public_key();
    let derived = support::random_secret_key();

    let config = MessengerConfig {
        min_fee_rate_nanos_per_kb: 1700,
        ..Default::default()
    };
    let messenger = Messenger::new(owner, config, MemoryNode::default());
    let grant = DerivedKeyGrant {
        expiration_block: 300_000,
        access_signature: "3045abcd".to_string(),
        transaction_spending_limit_hex: "0102".to_string(),
    };

    let authorized = messenger
        .authorize_derived_key(&derived, grant)
        .await
        .unwrap();
    assert_eq!(authorized.owner, owner_pub);
    assert_eq!(authorized.expiration_block, 300_000);
    assert_eq!(authorized.txn_hash_hex, "cafe");

    let node = messenger.client();
    let request = node.authorizations.lock().unwrap()[0].clone();
    assert_eq!(request.owner_public_key, owner_pub);
    assert_eq!(
        PublicKey::from_base58check(&request.derived_public_key).unwrap(),
        derived.public()
    );
    assert_eq!(request.derived_public_key, authorized.derived);
    assert!(request.derived_key_signature);
    assert!(!request.delete_key);
    assert_eq!(request.min_fee_rate_nanos_per_kb, 1700);
    assert_eq!(request.access_signature, "3045abcd");
    assert_eq!(request.transaction_spending_limit_hex, "0102");

    // signed by the derived key, not by the owner
    let submitted = hex::decode(&node.submitted.lock().unwrap()[0]).unwrap();
    let unsigned = UnsignedTransaction::from_hex(UNSIGNED_TX_HEX).unwrap();
    let signed = SignedTransaction::parse(submitted, unsigned.prefix().len()).unwrap();
    signed.verify(&unsigned, &derived.public()).unwrap();
    assert!(signed.verify(&unsigned, &owner_key).is_err());
}

#[tokio::test]
async fn test_authorize_derived_key_surfaces_node_errors() {
    let (owner, _) = support::random_identity();
    let node = MemoryNode {
        down: true,
        ..Default::default()
    };
    let messenger = Messenger::new(owner, MessengerConfig::default(), node);
    let grant = DerivedKeyGrant {
        expiration_block: 1,
        access_signature: String::new(),
        transaction_spending_limit_hex: String::new(),
    };

    let err = messenger
        .authorize_derived_key(&support::random_secret_key(), grant)
        .await
        .unwrap_err();
    assert!(matches!(err, MessengerError::Node(NodeDown)));
    assert!(messenger.client().submitted.lock().unwrap().is_empty());
}
