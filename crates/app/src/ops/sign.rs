use clap::Args;
use common::prelude::{TransactionError, UnsignedTransaction};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Sign {
    /// Unsigned transaction as built by the node, hex encoded
    pub unsigned_tx_hex: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SignError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

#[async_trait::async_trait]
impl crate::op::Op for Sign {
    type Error = SignError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity()?;
        let unsigned = UnsignedTransaction::from_hex(&self.unsigned_tx_hex)?;
        let signed = unsigned.sign(identity.secret_key())?;
        Ok(signed.to_hex())
    }
}
