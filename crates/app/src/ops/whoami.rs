use clap::Args;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Whoami;

#[async_trait::async_trait]
impl crate::op::Op for Whoami {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let identity = ctx.identity()?;
        Ok(format!(
            "public key: {}\nhex:        {}\nnetwork:    {}",
            identity.public_key_base58check(),
            identity.public_key().to_hex(),
            identity.network()
        ))
    }
}
