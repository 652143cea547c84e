pub mod decrypt;
pub mod encrypt;
pub mod inbox;
pub mod init;
pub mod shared_key;
pub mod sign;
pub mod version;
pub mod whoami;

pub use decrypt::Decrypt;
pub use encrypt::Encrypt;
pub use inbox::Inbox;
pub use init::Init;
pub use shared_key::SharedKey;
pub use sign::Sign;
pub use version::Version;
pub use whoami::Whoami;

#[cfg(test)]
mod test {
    use std::path::Path;

    use common::prelude::{Network, SecretKey, UnsignedTransaction};

    use super::*;
    use crate::op::{Op, OpContext};

    const ALICE_HEX: &str = "b71c71a67e1177ad4e901695e1b4b9ee17ae16c6668d313eac2f96dbcda3f291";
    const BOB_HEX: &str = "1111111111111111111111111111111111111111111111111111111111111111";

    async fn init(dir: &Path, seed_hex: &str) -> OpContext {
        let key_file = dir.with_extension("key");
        std::fs::write(&key_file, seed_hex).unwrap();

        let ctx = OpContext::new(Some(dir.to_path_buf()));
        Init {
            key_file,
            network: Network::Mainnet,
            log_level: "info".to_string(),
        }
        .execute(&ctx)
        .await
        .unwrap();
        ctx
    }

    fn base58(seed_hex: &str) -> String {
        SecretKey::from_hex(seed_hex)
            .unwrap()
            .public()
            .to_base58check(Network::Mainnet)
    }

    #[tokio::test]
    async fn test_encrypt_then_decrypt_between_users() {
        let temp = tempfile::tempdir().unwrap();
        let alice = init(&temp.path().join("alice"), ALICE_HEX).await;
        let bob = init(&temp.path().join("bob"), BOB_HEX).await;

        let ciphertext_hex = Encrypt {
            public_key: base58(BOB_HEX),
            text: "gm".to_string(),
        }
        .execute(&alice)
        .await
        .unwrap();

        let plaintext = Decrypt {
            public_key: base58(ALICE_HEX),
            ciphertext_hex,
        }
        .execute(&bob)
        .await
        .unwrap();
        assert_eq!(plaintext, "gm");
    }

    #[tokio::test]
    async fn test_shared_key_agrees() {
        let temp = tempfile::tempdir().unwrap();
        let alice = init(&temp.path().join("alice"), ALICE_HEX).await;
        let bob = init(&temp.path().join("bob"), BOB_HEX).await;

        let from_alice = SharedKey {
            public_key: base58(BOB_HEX),
        }
        .execute(&alice)
        .await
        .unwrap();
        let from_bob = SharedKey {
            public_key: base58(ALICE_HEX),
        }
        .execute(&bob)
        .await
        .unwrap();
        assert_eq!(from_alice, from_bob);
        assert_eq!(from_alice.len(), 64);
    }

    #[tokio::test]
    async fn test_sign_keeps_prefix() {
        let temp = tempfile::tempdir().unwrap();
        let alice = init(&temp.path().join("alice"), ALICE_HEX).await;

        let signed_hex = Sign {
            unsigned_tx_hex: "0a0b0c00".to_string(),
        }
        .execute(&alice)
        .await
        .unwrap();
        assert!(signed_hex.starts_with("0a0b0c"));

        let expected = UnsignedTransaction::from_hex("0a0b0c00")
            .unwrap()
            .sign(&SecretKey::from_hex(ALICE_HEX).unwrap())
            .unwrap();
        assert_eq!(signed_hex, expected.to_hex());
    }

    #[tokio::test]
    async fn test_ops_require_init() {
        let temp = tempfile::tempdir().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("nowhere")));

        let err = Whoami.execute(&ctx).await.unwrap_err();
        assert!(matches!(err, crate::state::StateError::NotInitialized));
    }

    #[tokio::test]
    async fn test_inbox_reads_saved_response() {
        let temp = tempfile::tempdir().unwrap();
        let alice = init(&temp.path().join("alice"), ALICE_HEX).await;

        let file = temp.path().join("messages.json");
        std::fs::write(&file, r#"{"OrderedContactsWithMessages": []}"#).unwrap();

        let output = Inbox { file }.execute(&alice).await.unwrap();
        assert_eq!(output, "decrypted: 0, skipped: 0, ignored: 0");
    }

    #[tokio::test]
    async fn test_inbox_decrypts_message_from_file() {
        use common::messaging::MessageExtraData;
        use common::node::{ContactWithMessages, GetMessagesResponse, MessageEntry};

        let temp = tempfile::tempdir().unwrap();
        let alice = init(&temp.path().join("alice"), ALICE_HEX).await;

        let bob_key = SecretKey::from_hex(BOB_HEX).unwrap();
        let alice_public = SecretKey::from_hex(ALICE_HEX).unwrap().public();
        let ciphertext = bob_key
            .shared_key(&alice_public)
            .encrypt(b"hello alice")
            .unwrap();
        let response = GetMessagesResponse {
            contacts: vec![ContactWithMessages {
                public_key: base58(BOB_HEX),
                messages: vec![MessageEntry {
                    sender_public_key: base58(BOB_HEX),
                    recipient_public_key: base58(ALICE_HEX),
                    encrypted_text: hex::encode(ciphertext),
                    tstamp_nanos: 1,
                    is_sender: false,
                    extra_data: Some(MessageExtraData::post("c1", "general", "m1").to_extra_data()),
                }],
            }],
        };

        let file = temp.path().join("messages.json");
        std::fs::write(&file, serde_json::to_string(&response).unwrap()).unwrap();

        let output = Inbox { file }.execute(&alice).await.unwrap();
        let mut lines = output.lines();
        let message: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(message["message"], "hello alice");
        assert_eq!(message["community_id"], "c1");
        assert_eq!(lines.next(), Some("decrypted: 1, skipped: 0, ignored: 0"));
    }
}
