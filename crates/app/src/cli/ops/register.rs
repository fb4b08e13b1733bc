use clap::Args;

use friends::services::{Registration, RegistrationError, SessionManagement};
use friends::state::{AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Register {
    /// Alias to register with the relay
    #[arg(long)]
    pub alias: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("already registered as '{0}'")]
    AlreadyRegistered(String),
    #[error("registration failed: {0}; run register again to resume")]
    Registration(#[from] RegistrationError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Register {
    type Error = RegisterError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut state = AppState::load(ctx.config_path.clone())?;
        if let Some(alias) = &state.config.alias {
            return Err(RegisterError::AlreadyRegistered(alias.clone()));
        }

        // the config keeps the provisional identity until everything else succeeded,
        //  so a failed run can be repeated
        let provisional = state.config.identity;
        let registration =
            Registration::new(state.crypto()?, SessionManagement::new(ctx.client.clone()));
        let identity = registration.register(&provisional, &self.alias).await?;

        state.config.identity = identity;
        state.config.alias = Some(self.alias.clone());
        state.save()?;

        Ok(format!("Registered '{}' as {}", self.alias, identity))
    }
}
