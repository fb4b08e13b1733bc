use clap::Args;

use friends::services::{LocationSharing, LocationSharingError, SharedDataService};
use friends::state::StateError;

use super::{open_session, SessionSetupError};

#[derive(Args, Debug, Clone)]
pub struct Locations {}

#[derive(Debug, thiserror::Error)]
pub enum LocationsError {
    #[error(transparent)]
    Session(#[from] SessionSetupError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("failed to fetch locations: {0}")]
    Sharing(#[from] LocationSharingError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Locations {
    type Error = LocationsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = open_session(ctx).await?;
        let sharing = LocationSharing::new(state.crypto()?, SharedDataService::new(ctx.client.clone()));
        let locations = sharing.friend_locations(&state.config.identity).await?;

        if locations.is_empty() {
            return Ok("No friend locations yet".to_string());
        }

        let lines: Vec<String> = locations
            .iter()
            .map(|(from, location)| {
                format!("{}  {:.5}, {:.5}", from, location.latitude, location.longitude)
            })
            .collect();
        Ok(lines.join("\n"))
    }
}
