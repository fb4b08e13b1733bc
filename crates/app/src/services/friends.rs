use common::prelude::{Identity, IdentityCrypto, IdentityCryptoError, KeyVault, WrappedSessionKey};
use relay::ApiError;

use super::key_update::KeyUpdateService;
use super::session::{SessionError, SessionManagement};

#[derive(Debug, thiserror::Error)]
pub enum FriendError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Crypto(#[from] IdentityCryptoError),
    #[error("relay error: {0}")]
    Api(#[from] ApiError),
}

/// Adding and removing friends
///
/// Adding a friend means: fetch their registered public key, keep it, wrap our
///  session key for it and push the result, after which the relay lets them
///  see what we share.
#[derive(Debug, Clone)]
pub struct FriendService<V: KeyVault> {
    crypto: IdentityCrypto<V>,
    session: SessionManagement,
    keys: KeyUpdateService,
}

impl<V: KeyVault> FriendService<V> {
    pub fn new(crypto: IdentityCrypto<V>, session: SessionManagement, keys: KeyUpdateService) -> Self {
        Self {
            crypto,
            session,
            keys,
        }
    }

    pub async fn add_friend(
        &self,
        local: &Identity,
        friend: &Identity,
    ) -> Result<WrappedSessionKey, FriendError> {
        let public_key = self.session.fetch_public_key(friend).await?;
        let der = public_key.to_der().map_err(IdentityCryptoError::from)?;
        self.crypto.store_friend_public_key(local, friend, &der)?;

        let wrapped = self.crypto.encrypt_session_key(local, friend)?;
        self.keys.update_keys([(*friend, wrapped.clone())]).await?;

        tracing::info!("added friend {}", friend);
        Ok(wrapped)
    }

    /// Forget a friend's public key
    ///
    /// The relay keeps the key we pushed earlier, so the friend can still open
    ///  records sealed under the current session key.
    pub fn remove_friend(&self, local: &Identity, friend: &Identity) -> Result<(), FriendError> {
        self.crypto.delete_friend_public_key(local, friend)?;
        tracing::info!("removed friend {}", friend);
        Ok(())
    }
}
