use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::RelayState;

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<RelayState>) -> Response {
    let msg = serde_json::json!({"status": "ok", "users": state.user_count()});
    (StatusCode::OK, Json(msg)).into_response()
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn test_handler_direct() {
        let response = handler(State(RelayState::new())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
