//! Payload encryption using AES-256-GCM
//!
//! Every local identity owns exactly one [`SessionKey`]. All payloads it shares with friends
//! are sealed under that key; friends learn the key through a
//! [`WrappedSessionKey`](super::WrappedSessionKey).

use std::ops::Deref;

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};

/// Size of AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Size of AES-256 key in bytes (256 bits)
pub const SESSION_KEY_SIZE: usize = 32;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SessionKeyError {
    #[error("session key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("decryption failed")]
    DecryptionFailed,
}

/// A 256-bit symmetric key sealing one identity's outgoing payloads
///
/// The sealed format is the "combined" AES-GCM layout:
/// `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
///
/// # Examples
///
/// ```ignore
/// let key = SessionKey::generate()?;
/// let sealed = key.encrypt(b"52.52,13.40")?;
/// let opened = key.decrypt(&sealed)?;
/// ```
#[derive(PartialEq, Eq, Clone)]
pub struct SessionKey([u8; SESSION_KEY_SIZE]);

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionKey({} bytes)", SESSION_KEY_SIZE)
    }
}

impl Deref for SessionKey {
    type Target = [u8; SESSION_KEY_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; SESSION_KEY_SIZE]> for SessionKey {
    fn from(bytes: [u8; SESSION_KEY_SIZE]) -> Self {
        SessionKey(bytes)
    }
}

impl SessionKey {
    /// Generate a new random key using a cryptographically secure RNG
    pub fn generate() -> Result<Self, SessionKeyError> {
        let mut buff = [0; SESSION_KEY_SIZE];
        getrandom::getrandom(&mut buff)
            .map_err(|e| anyhow::anyhow!("failed to generate session key: {}", e))?;
        Ok(Self(buff))
    }

    /// Create a key from its raw representation
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SESSION_KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SessionKeyError> {
        if data.len() != SESSION_KEY_SIZE {
            return Err(anyhow::anyhow!(
                "invalid session key size, expected {}, got {}",
                SESSION_KEY_SIZE,
                data.len()
            )
            .into());
        }
        let mut buff = [0; SESSION_KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the raw key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Seal data with a fresh random nonce
    ///
    /// Returns `nonce || ciphertext || tag`.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>, SessionKeyError> {
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.bytes()));

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut nonce_bytes)
            .map_err(|e| anyhow::anyhow!("failed to generate nonce: {}", e))?;
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|_| anyhow::anyhow!("encrypt error"))?;

        let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        out.extend_from_slice(nonce.as_ref());
        out.extend_from_slice(&ciphertext);

        Ok(out)
    }

    /// Open a combined sealed box
    ///
    /// # Errors
    ///
    /// Returns [`SessionKeyError::DecryptionFailed`] if the input is shorter than a nonce plus
    /// tag, or if the tag does not verify (tampered data or wrong key).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, SessionKeyError> {
        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(SessionKeyError::DecryptionFailed);
        }

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.bytes()));
        let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);
        cipher
            .decrypt(nonce, &data[NONCE_SIZE..])
            .map_err(|_| SessionKeyError::DecryptionFailed)
    }
}
