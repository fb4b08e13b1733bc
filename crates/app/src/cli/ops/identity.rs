use clap::Args;

use common::prelude::IdentityCryptoError;
use friends::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct ShowIdentity {}

#[derive(Debug, thiserror::Error)]
pub enum ShowIdentityError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Crypto(#[from] IdentityCryptoError),
    #[error("failed to encode public key: {0}")]
    Encode(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ShowIdentity {
    type Error = ShowIdentityError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::load(ctx.config_path.clone())?;
        let public_key = match state.crypto()?.public_key(&state.config.identity)? {
            Some(key) => key
                .to_base64()
                .map_err(|e| ShowIdentityError::Encode(e.to_string()))?,
            None => "<none>".to_string(),
        };

        let status = match &state.config.alias {
            Some(alias) => format!("registered as '{}'", alias),
            None => "provisional (not registered)".to_string(),
        };

        Ok(format!(
            "Identity: {}\nStatus: {}\nRelay: {}\nPublic key: {}",
            state.config.identity, status, state.config.relay_url, public_key
        ))
    }
}
