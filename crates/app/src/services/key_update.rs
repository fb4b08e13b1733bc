use common::prelude::{Identity, WrappedSessionKey};
use relay::http_server::api::keys::{KeyEntry, KeysRequest};
use relay::{ApiClient, ApiError};

/// Pushes wrapped session keys to the relay
///
/// Once a friend has our wrapped key, the relay starts showing them our
///  shared records. No local state.
#[derive(Debug, Clone)]
pub struct KeyUpdateService {
    client: ApiClient,
}

impl KeyUpdateService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn update_keys<I>(&self, entries: I) -> Result<(), ApiError>
    where
        I: IntoIterator<Item = (Identity, WrappedSessionKey)>,
    {
        let keys: Vec<KeyEntry> = entries
            .into_iter()
            .map(|(to, key)| KeyEntry {
                to,
                key: key.to_base64(),
            })
            .collect();
        if keys.is_empty() {
            return Ok(());
        }

        tracing::debug!("pushing {} wrapped keys", keys.len());
        self.client.call(KeysRequest { keys }).await
    }
}
