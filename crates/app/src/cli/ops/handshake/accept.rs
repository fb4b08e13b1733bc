use clap::Args;

use friends::services::{HandshakeError, HandshakeService};

use crate::cli::ops::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Accept {}

#[derive(Debug, thiserror::Error)]
pub enum AcceptError {
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Accept {
    type Error = AcceptError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        open_session(ctx).await?;
        let from = HandshakeService::new(ctx.client.clone()).accept().await?;
        Ok(format!(
            "Handshake from {}. Run 'friends friend add --friend {}' to share with them",
            from, from
        ))
    }
}
