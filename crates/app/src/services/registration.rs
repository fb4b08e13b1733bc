use reqwest::StatusCode;

use common::prelude::{Identity, IdentityCrypto, IdentityCryptoError, KeyVault};

use super::session::{SessionError, SessionManagement};

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("alias '{0}' is registered with a key we do not hold")]
    AliasTaken(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Crypto(#[from] IdentityCryptoError),
}

/// Registration that survives being interrupted
///
/// Registering touches the relay first and the local vault second. If a run dies in
///  between, the relay already holds the alias; running `register` again picks up
///  where it stopped as long as our key is the one the relay has on file.
#[derive(Debug, Clone)]
pub struct Registration<V: KeyVault> {
    crypto: IdentityCrypto<V>,
    session: SessionManagement,
}

impl<V: KeyVault> Registration<V> {
    pub fn new(crypto: IdentityCrypto<V>, session: SessionManagement) -> Self {
        Self { crypto, session }
    }

    /// Register `alias` with the keypair held under `provisional` and move the keys to
    ///  the assigned identity
    pub async fn register(
        &self,
        provisional: &Identity,
        alias: &str,
    ) -> Result<Identity, RegistrationError> {
        // no provisional key: either never generated, or already migrated by an earlier run
        if self.crypto.public_key(provisional)?.is_none() {
            if let Some(identity) = self.resume(provisional, alias).await? {
                return Ok(identity);
            }
        }

        let public_key = self.crypto.obtain_public_key(provisional)?;
        let identity = match self.session.register(alias, &public_key).await {
            Ok(identity) => identity,
            Err(SessionError::Api(e)) if e.status() == Some(StatusCode::CONFLICT) => {
                return self
                    .resume(provisional, alias)
                    .await?
                    .ok_or_else(|| RegistrationError::AliasTaken(alias.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        self.crypto.migrate(provisional, &identity)?;
        Ok(identity)
    }

    /// Finish a registration the relay already knows about
    ///
    /// Returns `None` if the relay has never seen the alias.
    async fn resume(
        &self,
        provisional: &Identity,
        alias: &str,
    ) -> Result<Option<Identity>, RegistrationError> {
        let identity = match self.session.login(alias).await {
            Ok(identity) => identity,
            Err(SessionError::Api(e)) if e.status() == Some(StatusCode::NOT_FOUND) => {
                return Ok(None)
            }
            Err(e) => return Err(e.into()),
        };
        let registered = self.session.fetch_public_key(&identity).await?;

        if self.crypto.public_key(&identity)?.as_ref() == Some(&registered) {
            tracing::info!("registration of {} was already complete", identity);
            return Ok(Some(identity));
        }
        if self.crypto.public_key(provisional)?.as_ref() == Some(&registered) {
            self.crypto.migrate(provisional, &identity)?;
            tracing::info!("resumed registration as {}", identity);
            return Ok(Some(identity));
        }
        Err(RegistrationError::AliasTaken(alias.to_string()))
    }
}
