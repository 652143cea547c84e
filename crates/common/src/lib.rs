/**
 * Cryptographic types and operations.
 *  - secp256k1 private and public keys
 *  - ECDH conversation keys and message encryption
 */
pub mod crypto;
/**
 * Typed message payloads, batch inbox decryption
 *  and the messenger that ties the core to a node.
 */
pub mod messaging;
/**
 * The interface a remote node client implements,
 *  along with the node's request/response shapes.
 */
pub mod node;
/**
 * Signing of node-built transactions, and the
 *  varint codec of their wire format.
 */
pub mod transaction;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{
        decrypt_message, derive_shared_key, encrypt_message, Network, PublicKey, Secret,
        SecretError, SecretKey, SharedKeyError,
    };
    pub use crate::messaging::{
        DecryptedMessage, DerivedKeyGrant, Identity, InboxReport, MessageExtraData, MessageType,
        Messenger, MessengerConfig,
    };
    pub use crate::node::NodeClient;
    pub use crate::transaction::{
        sign_transaction, SignedTransaction, TransactionError, UnsignedTransaction,
    };
    pub use crate::version::build_info;
}
