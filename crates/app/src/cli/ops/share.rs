use clap::Args;

use common::location::LocationError;
use common::prelude::Location;
use friends::services::{LocationSharing, LocationSharingError, SharedDataService};
use friends::state::StateError;

use super::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Share {
    #[arg(long, allow_negative_numbers = true)]
    pub latitude: f64,

    #[arg(long, allow_negative_numbers = true)]
    pub longitude: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to share location: {0}")]
    Sharing(#[from] LocationSharingError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = ShareError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let location = Location::new(self.latitude, self.longitude)?;
        let state = open_session(ctx).await?;

        let sharing = LocationSharing::new(state.crypto()?, SharedDataService::new(ctx.client.clone()));
        sharing
            .share_location(&state.config.identity, &location)
            .await?;
        Ok(format!(
            "Shared {:.5}, {:.5}",
            location.latitude, location.longitude
        ))
    }
}
