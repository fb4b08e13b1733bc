use axum::extract::{Json, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::SharedItemCategory;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::session::Session;
use crate::state::StateError;
use crate::RelayState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub category: SharedItemCategory,
    /// Base64 ciphertext, opaque to the relay
    pub data: String,
}

pub async fn handler(
    State(state): State<RelayState>,
    session: Session,
    Json(req): Json<UpdateRequest>,
) -> Result<impl IntoResponse, UpdateError> {
    state.update(session.identity, req.category, &req.data)?;
    tracing::debug!("{} updated {}", session.identity, req.category);
    Ok(http::StatusCode::NO_CONTENT)
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    State(#[from] StateError),
}

impl IntoResponse for UpdateError {
    fn into_response(self) -> Response {
        tracing::warn!("update failed: {}", self);
        let status = match &self {
            UpdateError::State(StateError::NotUpdatable(_)) => http::StatusCode::BAD_REQUEST,
            UpdateError::State(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for UpdateRequest {
    type Response = ();

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/update")?;
        Ok(client.put(full_url).json(&self))
    }
}
