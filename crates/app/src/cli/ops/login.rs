use clap::Args;

use super::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Login {}

#[async_trait::async_trait]
impl crate::cli::op::Op for Login {
    type Error = SessionSetupError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = open_session(ctx).await?;
        Ok(format!(
            "Logged in to {} as {}",
            state.config.relay_url, state.config.identity
        ))
    }
}
