use common::prelude::SharedItemCategory;
use relay::http_server::api::query::QueryRequest;
use relay::http_server::api::update::UpdateRequest;
use relay::http_server::api::SharedItem;
use relay::{ApiClient, ApiError};

#[derive(Debug, thiserror::Error)]
pub enum SharedDataError {
    #[error("category {0} does not accept updates")]
    CategoryNotUpdatable(SharedItemCategory),
    #[error("category {0} cannot be queried")]
    CategoryNotQueryable(SharedItemCategory),
    #[error("relay error: {0}")]
    Api(#[from] ApiError),
}

/// Pass-through access to the relay's category records
///
/// Never touches key material: payloads go in already encrypted and come
///  out still encrypted.
#[derive(Debug, Clone)]
pub struct SharedDataService {
    client: ApiClient,
}

impl SharedDataService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Replace the caller's record in `category`
    pub async fn update(
        &self,
        category: SharedItemCategory,
        data: String,
    ) -> Result<(), SharedDataError> {
        if !category.is_updatable() {
            return Err(SharedDataError::CategoryNotUpdatable(category));
        }
        self.client.call(UpdateRequest { category, data }).await?;
        Ok(())
    }

    /// All records in `category` visible to the caller, in no particular order
    pub async fn query(
        &self,
        category: SharedItemCategory,
    ) -> Result<Vec<SharedItem>, SharedDataError> {
        if !category.is_queryable() {
            return Err(SharedDataError::CategoryNotQueryable(category));
        }
        let response = self.client.call(QueryRequest { category }).await?;
        Ok(response.items)
    }
}
