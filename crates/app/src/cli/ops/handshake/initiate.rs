use clap::Args;

use common::prelude::Identity;
use friends::services::{HandshakeError, HandshakeService};

use crate::cli::ops::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Initiate {
    /// Identity of the user to befriend
    #[arg(long)]
    pub friend: Identity,
}

#[derive(Debug, thiserror::Error)]
pub enum InitiateError {
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Initiate {
    type Error = InitiateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        open_session(ctx).await?;
        HandshakeService::new(ctx.client.clone())
            .initiate(&self.friend)
            .await?;
        Ok(format!(
            "Handshake sent to {}. Once they accept, run 'friends friend add --friend {}'",
            self.friend, self.friend
        ))
    }
}
