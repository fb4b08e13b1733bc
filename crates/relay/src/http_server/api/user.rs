use axum::extract::{Json, Path, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{Identity, PublicKey};

use crate::http_server::api::client::ApiRequest;
use crate::http_server::session::session_cookie;
use crate::state::StateError;
use crate::RelayState;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Hex sha256 of the user's alias
    pub alias_hash: String,
    /// Base64 PKCS#1 DER public key
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub uuid: Identity,
}

pub async fn handler(
    State(state): State<RelayState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, UserError> {
    if req.alias_hash.trim().is_empty() {
        return Err(UserError::InvalidAlias);
    }
    PublicKey::from_base64(&req.public_key).map_err(|e| UserError::InvalidKey(e.to_string()))?;

    let uuid = state.register(&req.alias_hash, &req.public_key)?;
    let token = state.open_session(uuid);
    tracing::info!("registered user {}", uuid);

    Ok((
        http::StatusCode::CREATED,
        [(SET_COOKIE, session_cookie(&token))],
        Json(RegisterResponse { uuid }),
    ))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyRequest {
    pub uuid: Identity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub uuid: Identity,
    pub public_key: String,
}

pub async fn public_key_handler(
    State(state): State<RelayState>,
    Path(uuid): Path<Identity>,
) -> Result<impl IntoResponse, UserError> {
    let public_key = state.public_key(&uuid)?;
    Ok(Json(PublicKeyResponse { uuid, public_key }))
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("alias hash must not be empty")]
    InvalidAlias,
    #[error("invalid public key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    State(#[from] StateError),
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        tracing::warn!("user request failed: {}", self);
        let status = match &self {
            UserError::InvalidAlias | UserError::InvalidKey(_) => http::StatusCode::BAD_REQUEST,
            UserError::State(StateError::AliasTaken) => http::StatusCode::CONFLICT,
            UserError::State(StateError::UnknownUser(_)) => http::StatusCode::NOT_FOUND,
            UserError::State(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/user")?;
        Ok(client.post(full_url).json(&self))
    }
}

impl ApiRequest for PublicKeyRequest {
    type Response = PublicKeyResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!("/user/{}", self.uuid))?;
        Ok(client.get(full_url))
    }
}
