use clap::Args;

use common::prelude::Identity;
use friends::services::{FriendError, FriendService, KeyUpdateService, SessionManagement};
use friends::state::StateError;

use crate::cli::ops::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Add {
    /// Identity of the friend to share with
    #[arg(long)]
    pub friend: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum AddError {
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Friend(#[from] FriendError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Add {
    type Error = AddError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = open_session(ctx).await?;
        let service = FriendService::new(
            state.crypto()?,
            SessionManagement::new(ctx.client.clone()),
            KeyUpdateService::new(ctx.client.clone()),
        );
        service
            .add_friend(&state.config.identity, &self.friend)
            .await?;
        Ok(format!("{} can now see your location", self.friend))
    }
}
