//! Identity key lifecycle and payload encryption
//!
//! [`IdentityCrypto`] sits on top of a [`KeyVault`] and owns every piece of key
//! material a device holds:
//!
//! - one RSA keypair per local identity, generated on first use
//! - one AES session key per local identity, generated on first use
//! - the public keys of friends, stored per `(local, friend)` pair
//!
//! Every call names the local identity it acts for. There is no "current identity"
//! inside this type, so a migration can never race with a half-switched label.
//!
//! All material is stored under labels derived from identities:
//!
//! ```text
//! friends.key.private.<identity>          asymmetric, PKCS#1 DER private key
//! friends.key.public.<local>.<friend>     asymmetric, PKCS#1 DER public key
//! friends.key.session.<identity>          symmetric, 32 raw bytes
//! ```

use crate::crypto::{
    KeyError, PublicKey, SecretKey, SessionKey, SessionKeyError, WrappedKeyError,
    WrappedSessionKey,
};
use crate::identity::Identity;
use crate::vault::{KeyClass, KeyVault, PutMode, VaultError};

const LABEL_PREFIX: &str = "friends.key";

pub fn private_key_label(identity: &Identity) -> String {
    format!("{}.private.{}", LABEL_PREFIX, identity)
}

pub fn friend_key_label(local: &Identity, friend: &Identity) -> String {
    format!("{}.public.{}.{}", LABEL_PREFIX, local, friend)
}

pub fn session_key_label(identity: &Identity) -> String {
    format!("{}.session.{}", LABEL_PREFIX, identity)
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityCryptoError {
    #[error("no private key stored for {0}")]
    PrivateKeyNotFound(Identity),
    #[error("no public key stored for friend {0}")]
    PublicKeyNotFound(Identity),
    #[error("key material already exists for {0}")]
    AlreadyExists(Identity),
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("vault error: {0}")]
    Vault(#[from] VaultError),
    #[error("key error: {0}")]
    Key(#[from] KeyError),
    #[error("session key error: {0}")]
    SessionKey(SessionKeyError),
    #[error("wrapped key error: {0}")]
    WrappedKey(WrappedKeyError),
}

impl From<SessionKeyError> for IdentityCryptoError {
    fn from(e: SessionKeyError) -> Self {
        match e {
            SessionKeyError::DecryptionFailed => IdentityCryptoError::DecryptionFailed,
            e => IdentityCryptoError::SessionKey(e),
        }
    }
}

impl From<WrappedKeyError> for IdentityCryptoError {
    fn from(e: WrappedKeyError) -> Self {
        match e {
            WrappedKeyError::Key(e) => IdentityCryptoError::Key(e),
            WrappedKeyError::SessionKey(e) => e.into(),
            e => IdentityCryptoError::WrappedKey(e),
        }
    }
}

/// Key management and hybrid encryption for local identities
///
/// Assumes a single writer per identity: callers must not run `migrate` for an
/// identity while other calls for the same identity are in flight.
#[derive(Debug, Clone)]
pub struct IdentityCrypto<V: KeyVault> {
    vault: V,
}

impl<V: KeyVault> IdentityCrypto<V> {
    pub fn new(vault: V) -> Self {
        Self { vault }
    }

    pub fn vault(&self) -> &V {
        &self.vault
    }

    /// Return the identity's public key, generating its keypair if absent
    ///
    /// Idempotent: once a keypair exists it is returned unchanged.
    pub fn obtain_public_key(&self, identity: &Identity) -> Result<PublicKey, IdentityCryptoError> {
        if let Some(secret) = self.load_private_key(identity)? {
            return Ok(secret.public());
        }

        tracing::info!("generating identity keypair for {}", identity);
        let secret = SecretKey::generate()?;
        let label = private_key_label(identity);
        match self
            .vault
            .put(KeyClass::Asymmetric, &label, &secret.to_der()?, PutMode::InsertOnly)
        {
            Ok(()) => Ok(secret.public()),
            // somebody else stored one first, theirs wins
            Err(VaultError::AlreadyExists(_, _)) => self
                .load_private_key(identity)?
                .map(|s| s.public())
                .ok_or(IdentityCryptoError::PrivateKeyNotFound(*identity)),
            Err(e) => Err(e.into()),
        }
    }

    /// Return the identity's public key if it owns a keypair
    pub fn public_key(&self, identity: &Identity) -> Result<Option<PublicKey>, IdentityCryptoError> {
        Ok(self.load_private_key(identity)?.map(|s| s.public()))
    }

    /// Move an identity's key material from `from` to `to`
    ///
    /// The private key is required, the session key moves along if one exists.
    /// Afterwards nothing resolves under `from`'s labels.
    ///
    /// # Errors
    ///
    /// * `PrivateKeyNotFound` - `from` owns no keypair (including a second migration)
    /// * `AlreadyExists` - `to` already owns a keypair; `from` is left untouched
    pub fn migrate(&self, from: &Identity, to: &Identity) -> Result<(), IdentityCryptoError> {
        if from == to {
            return Ok(());
        }

        let from_private = private_key_label(from);
        let to_private = private_key_label(to);

        let secret = self
            .vault
            .get(KeyClass::Asymmetric, &from_private)?
            .ok_or(IdentityCryptoError::PrivateKeyNotFound(*from))?;

        match self
            .vault
            .put(KeyClass::Asymmetric, &to_private, &secret, PutMode::InsertOnly)
        {
            Ok(()) => {}
            Err(VaultError::AlreadyExists(_, _)) => {
                return Err(IdentityCryptoError::AlreadyExists(*to))
            }
            Err(e) => return Err(e.into()),
        }

        let from_session = session_key_label(from);
        if let Some(session) = self.vault.get(KeyClass::Symmetric, &from_session)? {
            // a stray session key under `to` has no keypair to go with it
            self.vault.put(
                KeyClass::Symmetric,
                &session_key_label(to),
                &session,
                PutMode::Upsert,
            )?;
            self.vault.delete(KeyClass::Symmetric, &from_session)?;
        }

        self.vault.delete(KeyClass::Asymmetric, &from_private)?;
        tracing::info!("migrated identity keys from {} to {}", from, to);
        Ok(())
    }

    /// Import and store a friend's public key from its external representation
    ///
    /// Replaces any key previously stored for the pair. The replacement is a
    /// delete followed by an insert and is not atomic.
    pub fn store_friend_public_key(
        &self,
        local: &Identity,
        friend: &Identity,
        external: &[u8],
    ) -> Result<PublicKey, IdentityCryptoError> {
        let key = PublicKey::from_der(external)?;
        let label = friend_key_label(local, friend);
        self.vault.delete(KeyClass::Asymmetric, &label)?;
        self.vault
            .put(KeyClass::Asymmetric, &label, &key.to_der()?, PutMode::InsertOnly)?;
        tracing::debug!("stored public key of {} for {}", friend, local);
        Ok(key)
    }

    pub fn friend_public_key(
        &self,
        local: &Identity,
        friend: &Identity,
    ) -> Result<Option<PublicKey>, IdentityCryptoError> {
        self.vault
            .get(KeyClass::Asymmetric, &friend_key_label(local, friend))?
            .map(|der| PublicKey::from_der(&der))
            .transpose()
            .map_err(Into::into)
    }

    pub fn delete_friend_public_key(
        &self,
        local: &Identity,
        friend: &Identity,
    ) -> Result<(), IdentityCryptoError> {
        self.vault
            .delete(KeyClass::Asymmetric, &friend_key_label(local, friend))?;
        Ok(())
    }

    /// Wrap the local session key for a friend
    ///
    /// The friend's public key must have been stored first.
    pub fn encrypt_session_key(
        &self,
        local: &Identity,
        friend: &Identity,
    ) -> Result<WrappedSessionKey, IdentityCryptoError> {
        let friend_key = self
            .friend_public_key(local, friend)?
            .ok_or(IdentityCryptoError::PublicKeyNotFound(*friend))?;
        let session = self.session_key(local)?;
        Ok(WrappedSessionKey::new(&session, &friend_key)?)
    }

    /// Seal a payload under the local session key
    pub fn encrypt(&self, local: &Identity, data: &[u8]) -> Result<Vec<u8>, IdentityCryptoError> {
        let session = self.session_key(local)?;
        Ok(session.encrypt(data)?)
    }

    /// Open a payload a friend sealed under their session key
    ///
    /// `wrapped` is the friend's session key wrapped for `local`.
    pub fn decrypt(
        &self,
        local: &Identity,
        data: &[u8],
        from: &Identity,
        wrapped: &WrappedSessionKey,
    ) -> Result<Vec<u8>, IdentityCryptoError> {
        let secret = self
            .load_private_key(local)?
            .ok_or(IdentityCryptoError::PrivateKeyNotFound(*local))?;

        let session = wrapped.recover(&secret).map_err(|e| {
            tracing::debug!("failed to unwrap session key from {}: {}", from, e);
            IdentityCryptoError::DecryptionFailed
        })?;

        Ok(session.decrypt(data)?)
    }

    fn load_private_key(&self, identity: &Identity) -> Result<Option<SecretKey>, IdentityCryptoError> {
        self.vault
            .get(KeyClass::Asymmetric, &private_key_label(identity))?
            .map(|der| SecretKey::from_der(&der))
            .transpose()
            .map_err(Into::into)
    }

    /// Load the identity's session key, creating it on first use
    fn session_key(&self, identity: &Identity) -> Result<SessionKey, IdentityCryptoError> {
        let label = session_key_label(identity);
        if let Some(raw) = self.vault.get(KeyClass::Symmetric, &label)? {
            return Ok(SessionKey::from_slice(&raw)?);
        }

        let session = SessionKey::generate()?;
        match self
            .vault
            .put(KeyClass::Symmetric, &label, session.bytes(), PutMode::InsertOnly)
        {
            Ok(()) => Ok(session),
            Err(VaultError::AlreadyExists(_, _)) => {
                let raw = self
                    .vault
                    .get(KeyClass::Symmetric, &label)?
                    .ok_or_else(|| VaultError::Backend(format!("{} vanished", label)))?;
                Ok(SessionKey::from_slice(&raw)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::{RSA_MODULUS_SIZE, SESSION_KEY_SIZE};
    use crate::vault::MemoryKeyVault;

    fn setup() -> (IdentityCrypto<MemoryKeyVault>, Identity) {
        (
            IdentityCrypto::new(MemoryKeyVault::new()),
            Identity::provisional(),
        )
    }

    #[test]
    fn test_obtain_public_key_is_idempotent() {
        let (crypto, me) = setup();
        assert!(crypto.public_key(&me).unwrap().is_none());

        let first = crypto.obtain_public_key(&me).unwrap();
        let second = crypto.obtain_public_key(&me).unwrap();
        assert_eq!(first, second);
        assert_eq!(crypto.public_key(&me).unwrap(), Some(first));
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let (crypto, me) = setup();
        let public = crypto.obtain_public_key(&me).unwrap();
        // wrapping for ourselves lets one identity open its own payloads
        crypto
            .store_friend_public_key(&me, &me, &public.to_der().unwrap())
            .unwrap();
        let wrapped = crypto.encrypt_session_key(&me, &me).unwrap();

        for len in [0usize, 1, 15, 16, 17, 1024] {
            let data = vec![7u8; len];
            let sealed = crypto.encrypt(&me, &data).unwrap();
            assert_eq!(crypto.decrypt(&me, &sealed, &me, &wrapped).unwrap(), data);
        }
    }

    #[test]
    fn test_friend_pair_exchange() {
        let vault = MemoryKeyVault::new();
        let crypto = IdentityCrypto::new(vault);
        let alice = Identity::provisional();
        let bob = Identity::provisional();

        crypto.obtain_public_key(&alice).unwrap();
        let bob_public = crypto.obtain_public_key(&bob).unwrap();

        crypto
            .store_friend_public_key(&alice, &bob, &bob_public.to_der().unwrap())
            .unwrap();
        let wrapped = crypto.encrypt_session_key(&alice, &bob).unwrap();
        assert_eq!(wrapped.bytes().len(), RSA_MODULUS_SIZE);

        let sealed = crypto.encrypt(&alice, b"hello").unwrap();
        let opened = crypto.decrypt(&bob, &sealed, &alice, &wrapped).unwrap();
        assert_eq!(opened, b"hello");

        // alice cannot open it with a key wrapped for bob
        assert!(matches!(
            crypto.decrypt(&alice, &sealed, &alice, &wrapped),
            Err(IdentityCryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let crypto = IdentityCrypto::new(MemoryKeyVault::new());
        let alice = Identity::provisional();
        let bob = Identity::provisional();
        let bob_public = crypto.obtain_public_key(&bob).unwrap();
        crypto
            .store_friend_public_key(&alice, &bob, &bob_public.to_der().unwrap())
            .unwrap();
        let wrapped = crypto.encrypt_session_key(&alice, &bob).unwrap();

        let mut sealed = crypto.encrypt(&alice, b"meet at noon").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0x01;
        assert!(matches!(
            crypto.decrypt(&bob, &sealed, &alice, &wrapped),
            Err(IdentityCryptoError::DecryptionFailed)
        ));
        assert!(matches!(
            crypto.decrypt(&bob, &sealed[..10], &alice, &wrapped),
            Err(IdentityCryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_encrypt_session_key_requires_friend_key() {
        let (crypto, me) = setup();
        let stranger = Identity::provisional();
        assert!(matches!(
            crypto.encrypt_session_key(&me, &stranger),
            Err(IdentityCryptoError::PublicKeyNotFound(id)) if id == stranger
        ));
    }

    #[test]
    fn test_store_friend_key_replaces_and_deletes() {
        let (crypto, me) = setup();
        let friend = Identity::provisional();
        let first = SecretKey::generate().unwrap().public();
        let second = SecretKey::generate().unwrap().public();

        crypto
            .store_friend_public_key(&me, &friend, &first.to_der().unwrap())
            .unwrap();
        crypto
            .store_friend_public_key(&me, &friend, &second.to_der().unwrap())
            .unwrap();
        assert_eq!(crypto.friend_public_key(&me, &friend).unwrap(), Some(second));

        crypto.delete_friend_public_key(&me, &friend).unwrap();
        assert!(crypto.friend_public_key(&me, &friend).unwrap().is_none());
        crypto.delete_friend_public_key(&me, &friend).unwrap();
    }

    #[test]
    fn test_store_malformed_friend_key() {
        let (crypto, me) = setup();
        assert!(matches!(
            crypto.store_friend_public_key(&me, &Identity::provisional(), b"garbage"),
            Err(IdentityCryptoError::Key(_))
        ));
    }

    #[test]
    fn test_migrate_moves_keys() {
        let (crypto, provisional) = setup();
        let assigned = Identity::provisional();

        let public = crypto.obtain_public_key(&provisional).unwrap();
        crypto.encrypt(&provisional, b"create session key").unwrap();
        let session = crypto
            .vault()
            .get(KeyClass::Symmetric, &session_key_label(&provisional))
            .unwrap()
            .unwrap();
        assert_eq!(session.len(), SESSION_KEY_SIZE);

        crypto.migrate(&provisional, &assigned).unwrap();

        assert_eq!(crypto.obtain_public_key(&assigned).unwrap(), public);
        assert!(crypto.public_key(&provisional).unwrap().is_none());
        assert!(crypto
            .vault()
            .get(KeyClass::Asymmetric, &private_key_label(&provisional))
            .unwrap()
            .is_none());
        assert!(crypto
            .vault()
            .get(KeyClass::Symmetric, &session_key_label(&provisional))
            .unwrap()
            .is_none());
        assert_eq!(
            crypto
                .vault()
                .get(KeyClass::Symmetric, &session_key_label(&assigned))
                .unwrap(),
            Some(session)
        );
    }

    #[test]
    fn test_migrate_twice_fails() {
        let (crypto, provisional) = setup();
        let assigned = Identity::provisional();
        crypto.obtain_public_key(&provisional).unwrap();

        crypto.migrate(&provisional, &assigned).unwrap();
        assert!(matches!(
            crypto.migrate(&provisional, &assigned),
            Err(IdentityCryptoError::PrivateKeyNotFound(id)) if id == provisional
        ));
    }

    #[test]
    fn test_migrate_onto_existing_keypair_leaves_source() {
        let (crypto, provisional) = setup();
        let assigned = Identity::provisional();
        let source = crypto.obtain_public_key(&provisional).unwrap();
        let target = crypto.obtain_public_key(&assigned).unwrap();

        assert!(matches!(
            crypto.migrate(&provisional, &assigned),
            Err(IdentityCryptoError::AlreadyExists(_))
        ));
        assert_eq!(crypto.public_key(&provisional).unwrap(), Some(source));
        assert_eq!(crypto.public_key(&assigned).unwrap(), Some(target));
    }

    #[test]
    fn test_works_over_file_vault() {
        let dir = tempfile::tempdir().unwrap();
        let me = Identity::provisional();
        let public = {
            let crypto = IdentityCrypto::new(crate::vault::FileKeyVault::open(dir.path()).unwrap());
            crypto.obtain_public_key(&me).unwrap()
        };

        let crypto = IdentityCrypto::new(crate::vault::FileKeyVault::open(dir.path()).unwrap());
        assert_eq!(crypto.public_key(&me).unwrap(), Some(public));
    }
}
