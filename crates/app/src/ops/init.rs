use std::path::PathBuf;

use clap::Args;
use common::prelude::Network;

use crate::state::{AppConfig, AppState, DEFAULT_LOG_LEVEL};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// File holding the private scalar, as PEM or 64 hex characters.
    /// Only its path is stored; the file is never copied or rewritten.
    #[arg(long)]
    pub key_file: PathBuf,

    /// Network prefix to show public keys with
    #[arg(long, default_value = "mainnet")]
    pub network: Network,

    /// Default log level (error, warn, info, debug, trace)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            network: self.network,
            log_level: self.log_level.clone(),
            ..AppConfig::new(self.key_file.clone())
        };

        let state = AppState::init(ctx.config_path.clone(), config)?;
        let identity = state.identity()?;

        let output = format!(
            "Initialized sahara directory at: {}\n\
             - Config: {}\n\
             - Key file: {}\n\
             - Network: {}\n\
             - Min fee rate (nanos/KB): {}\n\
             - Messages per fetch: {}\n\
             - Public key: {}",
            state.sahara_dir.display(),
            state.config_path.display(),
            state.config.key_file.display(),
            state.config.network,
            state.config.min_fee_rate_nanos_per_kb,
            state.config.num_to_fetch,
            identity.public_key_base58check()
        );

        Ok(output)
    }
}
