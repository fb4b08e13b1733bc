use sha2::{Digest, Sha256};

use common::prelude::{Identity, PublicKey};
use relay::http_server::api::logout::LogoutRequest;
use relay::http_server::api::session::{LoginRequest, LOGIN_CHALLENGE};
use relay::http_server::api::user::{PublicKeyRequest, RegisterRequest};
use relay::{ApiClient, ApiError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("relay error: {0}")]
    Api(ApiError),
    #[error("failed to process relay response: {0}")]
    ProcessingFailed(String),
}

impl From<ApiError> for SessionError {
    fn from(e: ApiError) -> Self {
        match e {
            // a success response we cannot make sense of is ours to report
            ApiError::Decode(e) => SessionError::ProcessingFailed(e.to_string()),
            e => SessionError::Api(e),
        }
    }
}

/// One-way hash standing in for the alias on the wire
///
/// Lowercase hex sha256. This is an identifier, not a credential: anybody who
///  knows the alias can compute it.
pub fn alias_hash(alias: &str) -> String {
    hex::encode(Sha256::digest(alias.as_bytes()))
}

/// Registration and login against the relay
///
/// A successful `register` or `login` leaves a relay session in the client's
///  cookie store; every other service built from a clone of the same client
///  acts as that user.
#[derive(Debug, Clone)]
pub struct SessionManagement {
    client: ApiClient,
}

impl SessionManagement {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Register `alias` with its identity public key and return the assigned identity
    ///
    /// Callers must follow up with `IdentityCrypto::migrate` from the provisional
    ///  identity the key was generated under.
    pub async fn register(
        &self,
        alias: &str,
        public_key: &PublicKey,
    ) -> Result<Identity, SessionError> {
        let public_key = public_key
            .to_base64()
            .map_err(|e| SessionError::ProcessingFailed(e.to_string()))?;
        let response = self
            .client
            .call(RegisterRequest {
                alias_hash: alias_hash(alias),
                public_key,
            })
            .await?;
        tracing::info!("registered as {}", response.uuid);
        Ok(response.uuid)
    }

    pub async fn login(&self, alias: &str) -> Result<Identity, SessionError> {
        let response = self
            .client
            .call(LoginRequest {
                alias_hash: alias_hash(alias),
                challenge: LOGIN_CHALLENGE.to_vec(),
            })
            .await?;
        tracing::debug!("logged in as {}", response.uuid);
        Ok(response.uuid)
    }

    /// End the relay sessions of the logged in user, on every client; key material stays where it is
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.client.call(LogoutRequest).await?;
        Ok(())
    }

    /// Fetch the public key a user registered with
    pub async fn fetch_public_key(&self, identity: &Identity) -> Result<PublicKey, SessionError> {
        let response = self
            .client
            .call(PublicKeyRequest { uuid: *identity })
            .await?;
        if response.uuid != *identity {
            return Err(SessionError::ProcessingFailed(format!(
                "asked for the key of {}, got {}",
                identity, response.uuid
            )));
        }
        PublicKey::from_base64(&response.public_key)
            .map_err(|e| SessionError::ProcessingFailed(e.to_string()))
    }
}
