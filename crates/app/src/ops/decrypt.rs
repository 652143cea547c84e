use clap::Args;
use common::crypto::KeyError;
use common::prelude::{decrypt_message, PublicKey, SecretError};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Decrypt {
    /// Sender public key, base58check encoded
    pub public_key: String,

    /// Ciphertext as printed by `encrypt`
    pub ciphertext_hex: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DecryptError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid public key: {0}")]
    PublicKey(#[from] KeyError),
    #[error("ciphertext is not hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error(transparent)]
    Secret(#[from] SecretError),
    #[error("plaintext is not utf-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Decrypt {
    type Error = DecryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity()?;
        let sender = PublicKey::from_base58check(&self.public_key)?;
        let key = identity.secret_key().shared_key(&sender);
        let ciphertext = hex::decode(self.ciphertext_hex.trim())?;
        let plaintext = decrypt_message(&key, &ciphertext)?;
        Ok(String::from_utf8(plaintext)?)
    }
}
