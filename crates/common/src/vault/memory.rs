use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::provider::{KeyClass, KeyVault, PutMode, VaultError};

/// In-memory key vault backed by HashMaps
///
/// Cloning shares the underlying storage. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyVault {
    inner: Arc<RwLock<MemoryKeyVaultInner>>,
}

#[derive(Debug, Default)]
struct MemoryKeyVaultInner {
    /// (class, label) -> material
    entries: HashMap<(KeyClass, String), Vec<u8>>,
}

impl MemoryKeyVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across both key classes
    pub fn len(&self) -> Result<usize, VaultError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| VaultError::Backend(format!("failed to acquire read lock: {}", e)))?;
        Ok(inner.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool, VaultError> {
        Ok(self.len()? == 0)
    }
}

impl KeyVault for MemoryKeyVault {
    fn put(
        &self,
        class: KeyClass,
        label: &str,
        material: &[u8],
        mode: PutMode,
    ) -> Result<(), VaultError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| VaultError::Backend(format!("failed to acquire write lock: {}", e)))?;

        let key = (class, label.to_string());
        if mode == PutMode::InsertOnly && inner.entries.contains_key(&key) {
            return Err(VaultError::AlreadyExists(class, label.to_string()));
        }
        inner.entries.insert(key, material.to_vec());
        Ok(())
    }

    fn get(&self, class: KeyClass, label: &str) -> Result<Option<Vec<u8>>, VaultError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| VaultError::Backend(format!("failed to acquire read lock: {}", e)))?;
        Ok(inner.entries.get(&(class, label.to_string())).cloned())
    }

    fn delete(&self, class: KeyClass, label: &str) -> Result<(), VaultError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| VaultError::Backend(format!("failed to acquire write lock: {}", e)))?;
        inner.entries.remove(&(class, label.to_string()));
        Ok(())
    }
}
