use clap::Args;
use common::crypto::KeyError;
use common::prelude::{encrypt_message, PublicKey, SecretError};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Encrypt {
    /// Recipient public key, base58check encoded
    pub public_key: String,

    /// Text to encrypt
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid public key: {0}")]
    PublicKey(#[from] KeyError),
    #[error(transparent)]
    Secret(#[from] SecretError),
}

#[async_trait::async_trait]
impl crate::op::Op for Encrypt {
    type Error = EncryptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity()?;
        let recipient = PublicKey::from_base58check(&self.public_key)?;
        let key = identity.secret_key().shared_key(&recipient);
        let ciphertext = encrypt_message(&key, self.text.as_bytes())?;
        Ok(hex::encode(ciphertext))
    }
}
