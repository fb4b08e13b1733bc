use clap::Args;

use friends::services::SessionManagement;

use super::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Logout {}

#[async_trait::async_trait]
impl crate::cli::op::Op for Logout {
    type Error = SessionSetupError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // each run starts with an empty cookie store, so log in to get a session to close;
        //  the relay then closes every session of this user
        let state = open_session(ctx).await?;
        SessionManagement::new(ctx.client.clone()).logout().await?;
        Ok(format!(
            "Logged {} out of {}; local keys are untouched",
            state.config.identity, state.config.relay_url
        ))
    }
}
