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

/// A session key wrapped for one recipient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub to: Identity,
    /// Base64 RSA ciphertext of the sender's session key
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysRequest {
    pub keys: Vec<KeyEntry>,
}

pub async fn handler(
    State(state): State<RelayState>,
    session: Session,
    Json(req): Json<KeysRequest>,
) -> Result<impl IntoResponse, KeysError> {
    if req.keys.iter().any(|entry| entry.key.is_empty()) {
        return Err(KeysError::EmptyKey);
    }

    let keys: Vec<_> = req
        .keys
        .into_iter()
        .map(|entry| (entry.to, entry.key))
        .collect();
    state.put_keys(session.identity, &keys)?;
    tracing::info!("stored {} wrapped keys from {}", keys.len(), session.identity);
    Ok(http::StatusCode::NO_CONTENT)
}

#[derive(Debug, thiserror::Error)]
pub enum KeysError {
    #[error("wrapped key must not be empty")]
    EmptyKey,
    #[error(transparent)]
    State(#[from] StateError),
}

impl IntoResponse for KeysError {
    fn into_response(self) -> Response {
        tracing::warn!("key update failed: {}", self);
        let status = match &self {
            KeysError::EmptyKey => http::StatusCode::BAD_REQUEST,
            KeysError::State(StateError::UnknownUser(_)) => http::StatusCode::NOT_FOUND,
            KeysError::State(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for KeysRequest {
    type Response = ();

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/keys")?;
        Ok(client.put(full_url).json(&self))
    }
}
