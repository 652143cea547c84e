use clap::Args;
use common::crypto::KeyError;
use common::prelude::PublicKey;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct SharedKey {
    /// Counterparty public key, base58check encoded
    pub public_key: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SharedKeyOpError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("invalid public key: {0}")]
    PublicKey(#[from] KeyError),
}

#[async_trait::async_trait]
impl crate::op::Op for SharedKey {
    type Error = SharedKeyOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity()?;
        let counterparty = PublicKey::from_base58check(&self.public_key)?;
        Ok(identity.secret_key().shared_key(&counterparty).to_hex())
    }
}
