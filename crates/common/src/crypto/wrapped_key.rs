//! Session key transport using RSA-PKCS1 v1.5
//!
//! A friend can only read our payloads once they hold our [`SessionKey`]. We hand it over by
//! encrypting the raw key bytes under the friend's RSA public key. The resulting
//! [`WrappedSessionKey`] is pushed to the relay once per friend, and the friend unwraps it with
//! their private key whenever they open one of our payloads.
//!
//! Both directions use PKCS1 v1.5 padding; peers must agree on it.

use std::convert::TryFrom;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::keys::{KeyError, PublicKey, SecretKey, RSA_MODULUS_SIZE};
use super::session_key::{SessionKey, SessionKeyError};

/// Size of a wrapped session key in bytes (the RSA modulus size)
pub const WRAPPED_KEY_SIZE: usize = RSA_MODULUS_SIZE;

/// Errors that can occur while wrapping or unwrapping a session key
#[derive(Debug, thiserror::Error)]
pub enum WrappedKeyError {
    #[error("wrapped key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("session key error: {0}")]
    SessionKey(#[from] SessionKeyError),
}

/// A session key encrypted for exactly one recipient
///
/// # Wire Format
///
/// ```text
/// [ rsa_pkcs1_ciphertext: 256 bytes ]
/// ```
///
/// Carried base64'd in the relay's `key` fields.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WrappedSessionKey(Vec<u8>);

impl TryFrom<&[u8]> for WrappedSessionKey {
    type Error = WrappedKeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != WRAPPED_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid wrapped key size, expected {}, got {}",
                WRAPPED_KEY_SIZE,
                bytes.len()
            )
            .into());
        }
        Ok(WrappedSessionKey(bytes.to_vec()))
    }
}

impl WrappedSessionKey {
    /// Wrap a session key for the holder of `recipient`'s private key
    pub fn new(key: &SessionKey, recipient: &PublicKey) -> Result<Self, WrappedKeyError> {
        let wrapped = recipient.encrypt(key.bytes())?;

        // sanity check the ciphertext is exactly one modulus long
        if wrapped.len() != WRAPPED_KEY_SIZE {
            return Err(anyhow::anyhow!("unexpected wrapped key size {}", wrapped.len()).into());
        }

        Ok(Self(wrapped))
    }

    /// Recover the session key using the recipient's private key
    ///
    /// # Errors
    ///
    /// Fails if the key was wrapped for somebody else, the data was corrupted, or the
    /// recovered bytes are not a 256-bit key.
    pub fn recover(&self, recipient_secret: &SecretKey) -> Result<SessionKey, WrappedKeyError> {
        let raw = recipient_secret.decrypt(&self.0)?;
        Ok(SessionKey::from_slice(&raw)?)
    }

    /// Parse a wrapped key from base64
    pub fn from_base64(encoded: &str) -> Result<Self, WrappedKeyError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| anyhow::anyhow!("base64 decode error: {}", e))?;
        Self::try_from(bytes.as_slice())
    }

    /// Convert wrapped key to base64
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    /// Get a reference to the raw wrapped bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
