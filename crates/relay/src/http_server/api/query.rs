use axum::extract::{Json, Path, State};
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::category::UnknownCategory;
use common::prelude::SharedItemCategory;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::SharedItem;
use crate::http_server::session::Session;
use crate::RelayState;

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub category: SharedItemCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub items: Vec<SharedItem>,
}

pub async fn handler(
    State(state): State<RelayState>,
    session: Session,
    Path(category): Path<String>,
) -> Result<impl IntoResponse, QueryError> {
    let category: SharedItemCategory = category.parse()?;
    if !category.is_queryable() {
        return Err(QueryError::NotQueryable(category));
    }

    let items = state
        .query(&session.identity, category)
        .into_iter()
        .map(|item| SharedItem {
            from: item.from,
            data: item.data,
            key: item.key,
        })
        .collect();
    Ok(Json(QueryResponse { items }))
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    #[error("category {0} cannot be queried")]
    NotQueryable(SharedItemCategory),
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        tracing::warn!("query failed: {}", self);
        let status = match &self {
            QueryError::UnknownCategory(_) => http::StatusCode::NOT_FOUND,
            QueryError::NotQueryable(_) => http::StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

impl ApiRequest for QueryRequest {
    type Response = QueryResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, url::ParseError> {
        let full_url = base_url.join(&format!("/query/{}", self.category.as_str()))?;
        Ok(client.get(full_url))
    }
}
