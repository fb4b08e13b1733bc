use std::fmt::{self, Debug, Display};

/// The kind of key material stored under a label
///
/// Asymmetric and symmetric material live in separate namespaces: the same label
///  may hold one of each, never two of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyClass {
    /// RSA private or public keys
    Asymmetric,
    /// Raw symmetric session keys
    Symmetric,
}

impl Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyClass::Asymmetric => write!(f, "asymmetric"),
            KeyClass::Symmetric => write!(f, "symmetric"),
        }
    }
}

/// How a `put` treats an occupied label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PutMode {
    /// Fail with `VaultError::AlreadyExists` if the label is taken
    #[default]
    InsertOnly,
    /// Replace whatever is stored under the label
    Upsert,
}

#[derive(thiserror::Error, Debug)]
pub enum VaultError {
    /// The label is already occupied for this key class
    #[error("{0} key already stored under label {1}")]
    AlreadyExists(KeyClass, String),
    /// The label cannot be used by this backend
    #[error("invalid vault label: {0}")]
    InvalidLabel(String),
    /// Unhandled backend failure
    #[error("vault backend error: {0}")]
    Backend(String),
    #[error("vault io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Secure storage for key material, addressed by string label
///
/// Material is opaque bytes to the vault; callers pick the `KeyClass`. Backends
///  are expected to keep the material out of reach of other processes (OS secure
///  storage, owner-only files, ...).
///
/// A vault assumes a single writer per label. Replacing material is a two step
///  `delete` + `put` unless the backend is handed `PutMode::Upsert`, and neither
///  path is atomic against a concurrent writer.
pub trait KeyVault: Send + Sync + Debug {
    /// Store material under a label
    ///
    /// Should fail with the following errors to be considered correct:
    /// * `Err(VaultError::AlreadyExists)` - `mode` is `InsertOnly` and the label is occupied
    fn put(
        &self,
        class: KeyClass,
        label: &str,
        material: &[u8],
        mode: PutMode,
    ) -> Result<(), VaultError>;

    /// Read the material stored under a label, `None` if absent
    fn get(&self, class: KeyClass, label: &str) -> Result<Option<Vec<u8>>, VaultError>;

    /// Remove the material stored under a label
    ///
    /// Succeeds if nothing was stored there.
    fn delete(&self, class: KeyClass, label: &str) -> Result<(), VaultError>;

    /// Check if a label is occupied
    fn contains(&self, class: KeyClass, label: &str) -> Result<bool, VaultError> {
        Ok(self.get(class, label)?.is_some())
    }
}

impl<V: KeyVault + ?Sized> KeyVault for std::sync::Arc<V> {
    fn put(
        &self,
        class: KeyClass,
        label: &str,
        material: &[u8],
        mode: PutMode,
    ) -> Result<(), VaultError> {
        (**self).put(class, label, material, mode)
    }

    fn get(&self, class: KeyClass, label: &str) -> Result<Option<Vec<u8>>, VaultError> {
        (**self).get(class, label)
    }

    fn delete(&self, class: KeyClass, label: &str) -> Result<(), VaultError> {
        (**self).delete(class, label)
    }
}
