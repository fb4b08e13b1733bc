pub mod friend;
pub mod handshake;
pub mod identity;
pub mod init;
pub mod locations;
pub mod login;
pub mod logout;
pub mod register;
pub mod share;

pub use friend::Friend;
pub use handshake::Handshake;
pub use identity::ShowIdentity;
pub use init::Init;
pub use locations::Locations;
pub use login::Login;
pub use logout::Logout;
pub use register::Register;
pub use share::Share;

use common::prelude::Identity;
use friends::services::{SessionError, SessionManagement};
use friends::state::{AppState, StateError};

use crate::cli::op::OpContext;

#[derive(Debug, thiserror::Error)]
pub enum SessionSetupError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("login failed: {0}")]
    Session(#[from] SessionError),
    #[error("relay knows this alias as {got}, but local keys belong to {expected}")]
    IdentityMismatch { expected: Identity, got: Identity },
}

/// Load state and log in as the registered user
///
/// Relay sessions only live in the client's cookie store, so every relay-bound
///  command opens its own.
pub async fn open_session(ctx: &OpContext) -> Result<AppState, SessionSetupError> {
    let state = AppState::load(ctx.config_path.clone())?;
    let alias = state
        .config
        .alias
        .as_deref()
        .ok_or(StateError::NotRegistered)?;

    let identity = SessionManagement::new(ctx.client.clone())
        .login(alias)
        .await?;
    if identity != state.config.identity {
        return Err(SessionSetupError::IdentityMismatch {
            expected: state.config.identity,
            got: identity,
        });
    }
    Ok(state)
}
