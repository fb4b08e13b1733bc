use clap::Args;

use common::prelude::Identity;
use friends::services::{FriendError, FriendService, KeyUpdateService, SessionManagement};
use friends::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Remove {
    /// Identity of the friend to forget
    #[arg(long)]
    pub friend: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoveError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Friend(#[from] FriendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Remove {
    type Error = RemoveError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // local only; no relay session needed
        let state = AppState::load(ctx.config_path.clone())?;
        let service = FriendService::new(
            state.crypto()?,
            SessionManagement::new(ctx.client.clone()),
            KeyUpdateService::new(ctx.client.clone()),
        );
        service.remove_friend(&state.config.identity, &self.friend)?;
        Ok(format!("Forgot the public key of {}", self.friend))
    }
}
