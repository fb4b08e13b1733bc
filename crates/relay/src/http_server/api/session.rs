use axum::extract::{Json, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::Identity;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::session::session_cookie;
use crate::state::StateError;
use crate::RelayState;

/// Placeholder challenge sent on login; the relay does not check it
pub const LOGIN_CHALLENGE: [u8; 2] = [1, 23];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub alias_hash: String,
    pub challenge: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub uuid: Identity,
}

pub async fn handler(
    State(state): State<RelayState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, LoginError> {
    // TODO: verify the challenge against the registered public key once clients sign it
    let uuid = state.lookup_alias(&req.alias_hash)?;
    let token = state.open_session(uuid);
    tracing::info!("opened session for {}", uuid);

    Ok((
        [(SET_COOKIE, session_cookie(&token))],
        Json(LoginResponse { uuid }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    State(#[from] StateError),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        tracing::warn!("login failed: {}", self);
        let status = match &self {
            LoginError::State(StateError::UnknownAlias) => http::StatusCode::NOT_FOUND,
            LoginError::State(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/session")?;
        Ok(client.post(full_url).json(&self))
    }
}
