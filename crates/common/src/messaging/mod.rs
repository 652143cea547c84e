//! Direct messages between community members
//!
//! - [`MessageExtraData`]: the public, typed metadata of a message
//! - [`decrypt_inbox`]: batch decryption with per-message failure isolation
//! - [`Messenger`]: send and fetch through a [`NodeClient`](crate::node::NodeClient), and
//!   authorize derived keys

mod inbox;
mod messenger;
mod payload;

pub use inbox::{decrypt_entry, decrypt_inbox, DecryptedMessage, InboxError, InboxReport};
pub use messenger::{
    AuthorizedKey, DerivedKeyGrant, Identity, Messenger, MessengerConfig, MessengerError,
    SentMessage,
};
pub use payload::{MessageExtraData, MessageType, PayloadError};
