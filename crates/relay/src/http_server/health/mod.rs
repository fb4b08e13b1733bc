use axum::routing::get;
use axum::Router;

use crate::RelayState;

mod liveness;

pub fn router(state: RelayState) -> Router<RelayState> {
    Router::new()
        .route("/livez", get(liveness::handler))
        .with_state(state)
}
