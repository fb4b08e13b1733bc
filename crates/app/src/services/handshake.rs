use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use common::prelude::{Identity, SharedItemCategory};
use relay::http_server::api::handshake::HandshakeRequest;
use relay::{ApiClient, ApiError};

use super::shared_data::{SharedDataError, SharedDataService};

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("no user {0} to hand shake with")]
    HandshakePartnerNotFound(Identity),
    #[error("no pending handshake")]
    NoHandshakeAvailable,
    #[error("relay error: {0}")]
    Api(ApiError),
    #[error(transparent)]
    SharedData(#[from] SharedDataError),
}

/// Where a handshake with one friend stands, as seen from this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandshakeState {
    #[default]
    Idle,
    /// We asked them
    Initiated,
    /// We picked up their request
    Accepted,
}

/// Friend discovery through the relay's handshake inbox
#[derive(Debug, Clone)]
pub struct HandshakeService {
    client: ApiClient,
    shared_data: SharedDataService,
    states: Arc<RwLock<HashMap<Identity, HandshakeState>>>,
}

impl HandshakeService {
    pub fn new(client: ApiClient) -> Self {
        Self {
            shared_data: SharedDataService::new(client.clone()),
            client,
            states: Arc::default(),
        }
    }

    /// Leave a handshake request in `friend`'s inbox
    pub async fn initiate(&self, friend: &Identity) -> Result<(), HandshakeError> {
        // TODO: replace with a seed encrypted under the friend's public key and check it on accept
        let seed = Uuid::new_v4().simple().to_string();

        let request = HandshakeRequest {
            friend_id: *friend,
            encrypted_seed: seed,
        };
        match self.client.call(request).await {
            Ok(()) => {}
            Err(ApiError::HttpStatus(status, _)) if status == reqwest::StatusCode::NOT_FOUND => {
                return Err(HandshakeError::HandshakePartnerNotFound(*friend))
            }
            Err(e) => return Err(HandshakeError::Api(e)),
        }

        tracing::info!("initiated handshake with {}", friend);
        self.states.write().insert(*friend, HandshakeState::Initiated);
        Ok(())
    }

    /// Pick up the first pending handshake and return who sent it
    ///
    /// Senders this service already accepted are skipped; the relay drops their
    ///  request once we push them our key. The seed is not checked against anything.
    pub async fn accept(&self) -> Result<Identity, HandshakeError> {
        let items = self.shared_data.query(SharedItemCategory::Handshake).await?;
        let from = items
            .iter()
            .map(|item| item.from)
            .find(|from| self.state(from) != HandshakeState::Accepted)
            .ok_or(HandshakeError::NoHandshakeAvailable)?;

        tracing::info!("accepted handshake from {}", from);
        self.states.write().insert(from, HandshakeState::Accepted);
        Ok(from)
    }

    pub fn state(&self, friend: &Identity) -> HandshakeState {
        self.states.read().get(friend).copied().unwrap_or_default()
    }
}
