//! The relay's wire api
//!
//! Every endpoint lives in its own module holding the request/response types, the
//! axum handler, and the [`client::ApiRequest`] impl the client side uses to call it.
//! Bodies are camelCase JSON; keys and ciphertexts travel as base64 strings.

use axum::routing::{get, post, put};
use axum::Router;
use serde::{Deserialize, Serialize};

use common::prelude::Identity;

use crate::RelayState;

pub mod client;
pub mod handshake;
pub mod keys;
pub mod logout;
pub mod query;
pub mod session;
pub mod update;
pub mod user;

/// One relay-held record as returned by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedItem {
    pub from: Identity,
    /// Opaque payload: a handshake seed or a base64 ciphertext
    pub data: String,
    /// Sender's session key wrapped for the caller, base64
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

pub fn router(state: RelayState) -> Router<RelayState> {
    Router::new()
        .route("/user", post(user::handler))
        .route("/user/:uuid", get(user::public_key_handler))
        .route("/session", post(session::handler))
        .route("/logout", get(logout::handler))
        .route("/handshake", post(handshake::handler))
        .route("/keys", put(keys::handler))
        .route("/update", put(update::handler))
        .route("/query/:category", get(query::handler))
        .with_state(state)
}
