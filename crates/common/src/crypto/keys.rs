use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand_core::OsRng;
use rsa::pkcs1::{
    DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding,
};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

/// Size of the RSA modulus in bits
pub const RSA_KEY_BITS: usize = 2048;
/// Size of the RSA modulus in bytes, and of every PKCS1 ciphertext it produces
pub const RSA_MODULUS_SIZE: usize = RSA_KEY_BITS / 8;

/// Errors that can occur during key operations
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key error: {0}")]
    Default(#[from] anyhow::Error),
    #[error("failed to import key: {0}")]
    Import(String),
    #[error("unsupported key size, expected {RSA_KEY_BITS} bits, got {0}")]
    KeySize(usize),
}

/// Public half of an identity keypair
///
/// Wraps an RSA-2048 public key. On the wire and in the vault the key travels in its
/// external representation: the PKCS#1 `RSAPublicKey` DER encoding, base64'd when it is
/// carried inside JSON.
///
/// The key is used by friends to wrap their session keys for the owner of the matching
/// [`SecretKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        PublicKey(key)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = KeyError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_der(bytes)
    }
}

impl PublicKey {
    /// Import a public key from its PKCS#1 DER external representation
    ///
    /// # Errors
    ///
    /// Fails on malformed bytes or on a modulus that is not 2048 bits.
    pub fn from_der(bytes: &[u8]) -> Result<Self, KeyError> {
        let key = RsaPublicKey::from_pkcs1_der(bytes).map_err(|e| KeyError::Import(e.to_string()))?;
        let bits = key.size() * 8;
        if bits != RSA_KEY_BITS {
            return Err(KeyError::KeySize(bits));
        }
        Ok(Self(key))
    }

    /// Export the PKCS#1 DER external representation
    pub fn to_der(&self) -> Result<Vec<u8>, KeyError> {
        let doc = self
            .0
            .to_pkcs1_der()
            .map_err(|e| anyhow::anyhow!("public key encode error: {}", e))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Parse a public key from base64'd DER
    pub fn from_base64(encoded: &str) -> Result<Self, KeyError> {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| KeyError::Import(format!("base64 decode error: {}", e)))?;
        Self::from_der(&bytes)
    }

    /// Convert public key to base64'd DER
    pub fn to_base64(&self) -> Result<String, KeyError> {
        Ok(BASE64.encode(self.to_der()?))
    }

    /// Encrypt a short message under this key with RSA-PKCS1 v1.5
    ///
    /// The output is always [`RSA_MODULUS_SIZE`] bytes long.
    pub(crate) fn encrypt(&self, msg: &[u8]) -> Result<Vec<u8>, KeyError> {
        let ciphertext = self
            .0
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, msg)
            .map_err(|e| anyhow::anyhow!("rsa encrypt error: {}", e))?;
        Ok(ciphertext)
    }
}

/// Private half of an identity keypair
///
/// Never leaves the key vault in plaintext form except through [`SecretKey::to_der`], which
/// exists only so a vault backend can persist it.
///
/// # Examples
///
/// ```ignore
/// let secret_key = SecretKey::generate()?;
/// let public_key = secret_key.public();
///
/// let pem = secret_key.to_pem()?;
/// let recovered = SecretKey::from_pem(&pem)?;
/// ```
#[derive(Clone)]
pub struct SecretKey(RsaPrivateKey);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretKey")
            .field("public", &self.public())
            .finish_non_exhaustive()
    }
}

impl SecretKey {
    /// Generate a new RSA-2048 keypair using the OS RNG
    pub fn generate() -> Result<Self, KeyError> {
        let key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| anyhow::anyhow!("rsa key generation failed: {}", e))?;
        Ok(Self(key))
    }

    /// Derive the public key from this secret key
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Import a secret key from PKCS#1 DER
    pub fn from_der(bytes: &[u8]) -> Result<Self, KeyError> {
        let key =
            RsaPrivateKey::from_pkcs1_der(bytes).map_err(|e| KeyError::Import(e.to_string()))?;
        Ok(Self(key))
    }

    /// Export the secret key as PKCS#1 DER
    pub fn to_der(&self) -> Result<Vec<u8>, KeyError> {
        let doc = self
            .0
            .to_pkcs1_der()
            .map_err(|e| anyhow::anyhow!("private key encode error: {}", e))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Encode secret key in PEM format
    ///
    /// Returns a PEM-encoded string with tag "RSA PRIVATE KEY".
    pub fn to_pem(&self) -> Result<String, KeyError> {
        let pem = self
            .0
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| anyhow::anyhow!("private key pem encode error: {}", e))?;
        Ok(pem.as_str().to_owned())
    }

    /// Parse a secret key from PEM format
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let key = RsaPrivateKey::from_pkcs1_pem(pem)
            .map_err(|e| KeyError::Import(format!("failed to parse PEM: {}", e)))?;
        Ok(Self(key))
    }

    /// Decrypt an RSA-PKCS1 v1.5 ciphertext addressed to this key
    pub(crate) fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KeyError> {
        let plaintext = self
            .0
            .decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|e| anyhow::anyhow!("rsa decrypt error: {}", e))?;
        Ok(plaintext)
    }
}
