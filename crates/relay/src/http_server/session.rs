//! Cookie-carried relay sessions
//!
//! `/user` and `/session` hand out an opaque token in the `friends_session` cookie.
//! Handlers that act on behalf of a user take a [`Session`] extractor, which
//! resolves the cookie against the relay state or rejects with 401.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use common::prelude::Identity;

use crate::RelayState;

pub const SESSION_COOKIE: &str = "friends_session";

/// The caller of a request, resolved from its session cookie
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("no session cookie")]
    Missing,
    #[error("session is not active")]
    Inactive,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        tracing::debug!("rejecting request: {}", self);
        (StatusCode::UNAUTHORIZED, self.to_string()).into_response()
    }
}

#[async_trait]
impl FromRequestParts<RelayState> for Session {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &RelayState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(SessionRejection::Missing)?;
        let identity = state
            .session_identity(&token)
            .ok_or(SessionRejection::Inactive)?;
        Ok(Session { identity, token })
    }
}

/// Pull the session token out of the request's Cookie headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Set-Cookie value establishing a session
pub fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Strict", SESSION_COOKIE, token)
}

/// Set-Cookie value expiring the session cookie
pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; friends_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(COOKIE, HeaderValue::from_static("friends_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[tokio::test]
    async fn test_extractor_resolves_active_sessions() {
        let state = RelayState::new();
        let id = state.register("alias", "pk").unwrap();
        let token = state.open_session(id);

        let request = axum::http::Request::builder()
            .header(COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        let session = Session::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(session.identity, id);

        state.close_session(&token);
        assert!(matches!(
            Session::from_request_parts(&mut parts, &state).await,
            Err(SessionRejection::Inactive)
        ));
    }
}
