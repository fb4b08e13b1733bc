use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use common::location::LocationError;
use common::prelude::{
    Identity, IdentityCrypto, IdentityCryptoError, KeyVault, Location, SharedItemCategory,
    WrappedSessionKey,
};
use relay::http_server::api::SharedItem;

use super::shared_data::{SharedDataError, SharedDataService};

#[derive(Debug, thiserror::Error)]
pub enum LocationSharingError {
    #[error(transparent)]
    Location(#[from] LocationError),
    #[error(transparent)]
    Crypto(#[from] IdentityCryptoError),
    #[error(transparent)]
    SharedData(#[from] SharedDataError),
}

/// Encrypted location exchange on top of the `location` category
#[derive(Debug, Clone)]
pub struct LocationSharing<V: KeyVault> {
    crypto: IdentityCrypto<V>,
    shared_data: SharedDataService,
}

impl<V: KeyVault> LocationSharing<V> {
    pub fn new(crypto: IdentityCrypto<V>, shared_data: SharedDataService) -> Self {
        Self {
            crypto,
            shared_data,
        }
    }

    /// Seal `location` under our session key and publish it
    pub async fn share_location(
        &self,
        local: &Identity,
        location: &Location,
    ) -> Result<(), LocationSharingError> {
        let sealed = self.crypto.encrypt(local, &location.to_bytes()?)?;
        self.shared_data
            .update(SharedItemCategory::Location, BASE64.encode(sealed))
            .await?;
        Ok(())
    }

    /// Latest location of every friend who shared their key with us
    ///
    /// Records that cannot be opened are logged and skipped.
    pub async fn friend_locations(
        &self,
        local: &Identity,
    ) -> Result<Vec<(Identity, Location)>, LocationSharingError> {
        let items = self.shared_data.query(SharedItemCategory::Location).await?;

        let mut locations = Vec::with_capacity(items.len());
        for item in items {
            match self.open(local, &item) {
                Ok(Some(location)) => locations.push((item.from, location)),
                Ok(None) => tracing::warn!("location from {} carries no key, skipping", item.from),
                Err(e) => tracing::warn!("failed to open location from {}: {}", item.from, e),
            }
        }
        Ok(locations)
    }

    fn open(
        &self,
        local: &Identity,
        item: &SharedItem,
    ) -> Result<Option<Location>, LocationSharingError> {
        let Some(key) = &item.key else {
            return Ok(None);
        };
        let wrapped = WrappedSessionKey::from_base64(key).map_err(|e| {
            tracing::debug!("malformed wrapped key: {}", e);
            IdentityCryptoError::DecryptionFailed
        })?;
        let sealed = BASE64
            .decode(&item.data)
            .map_err(|_| IdentityCryptoError::DecryptionFailed)?;

        let opened = self.crypto.decrypt(local, &sealed, &item.from, &wrapped)?;
        Ok(Some(Location::from_bytes(&opened)?))
    }
}
