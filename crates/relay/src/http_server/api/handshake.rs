use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::Identity;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::session::Session;
use crate::state::StateError;
use crate::RelayState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequest {
    /// The user being asked to become a friend
    pub friend_id: Identity,
    pub encrypted_seed: String,
}

pub async fn handler(
    State(state): State<RelayState>,
    session: Session,
    Json(req): Json<HandshakeRequest>,
) -> Result<impl IntoResponse, HandshakeError> {
    state.handshake(session.identity, &req.friend_id, &req.encrypted_seed)?;
    tracing::info!("handshake {} -> {}", session.identity, req.friend_id);
    Ok(http::StatusCode::NO_CONTENT)
}

#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error(transparent)]
    State(#[from] StateError),
}

impl IntoResponse for HandshakeError {
    fn into_response(self) -> Response {
        tracing::warn!("handshake failed: {}", self);
        let status = match &self {
            HandshakeError::State(StateError::UnknownUser(_)) => http::StatusCode::NOT_FOUND,
            HandshakeError::State(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for HandshakeRequest {
    type Response = ();

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/handshake")?;
        Ok(client.post(full_url).json(&self))
    }
}
