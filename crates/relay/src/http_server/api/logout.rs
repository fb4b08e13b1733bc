use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::session::{expired_session_cookie, session_token};
use crate::RelayState;

#[derive(Debug, Clone, Default)]
pub struct LogoutRequest;

/// Drop every session of the caller, if any; always succeeds
pub async fn handler(State(state): State<RelayState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(identity) = session_token(&headers).and_then(|token| state.close_session(&token)) {
        tracing::info!("closed session for {}", identity);
    }
    [(SET_COOKIE, expired_session_cookie())]
}

impl ApiRequest for LogoutRequest {
    type Response = ();

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join("/logout")?;
        Ok(client.get(full_url))
    }
}
