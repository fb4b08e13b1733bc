use clap::Args;
use url::Url;

use common::prelude::IdentityCryptoError;
use friends::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Relay to store in config (defaults to --remote)
    #[arg(long)]
    pub relay_url: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
    #[error("failed to generate identity keys: {0}")]
    Crypto(#[from] IdentityCryptoError),
    #[error("key generation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let relay_url = self
            .relay_url
            .clone()
            .unwrap_or_else(|| ctx.client.base_url().clone());
        let state = AppState::init(ctx.config_path.clone(), relay_url)?;

        // RSA generation is slow enough to keep off the runtime
        let crypto = state.crypto()?;
        let identity = state.config.identity;
        tokio::task::spawn_blocking(move || crypto.obtain_public_key(&identity)).await??;

        let output = format!(
            "Initialized friends directory at: {}\n\
             - Vault: {}\n\
             - Config: {}\n\
             - Relay: {}\n\
             - Provisional identity: {}",
            state.friends_dir.display(),
            state.vault_path.display(),
            state.config_path.display(),
            state.config.relay_url,
            state.config.identity,
        );

        Ok(output)
    }
}
