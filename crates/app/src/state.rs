use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{FileKeyVault, Identity, IdentityCrypto, VaultError};

pub const APP_NAME: &str = "friends";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const VAULT_DIR_NAME: &str = "vault";
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Relay to talk to
    pub relay_url: Url,
    /// The identity our keys live under; provisional until registration
    pub identity: Identity,
    /// Set once registered, used to log in again
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl AppConfig {
    pub fn new(relay_url: Url) -> Self {
        Self {
            relay_url,
            identity: Identity::provisional(),
            alias: None,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.alias.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the friends directory (~/.friends)
    pub friends_dir: PathBuf,
    /// Path to the key vault directory
    pub vault_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the friends directory path (custom or default ~/.friends)
    pub fn friends_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new friends state directory under a fresh provisional identity
    pub fn init(custom_path: Option<PathBuf>, relay_url: Url) -> Result<Self, StateError> {
        let friends_dir = Self::friends_dir(custom_path)?;

        if friends_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&friends_dir)?;

        let vault_path = friends_dir.join(VAULT_DIR_NAME);
        FileKeyVault::open(&vault_path)?;

        let state = Self {
            config_path: friends_dir.join(CONFIG_FILE_NAME),
            friends_dir,
            vault_path,
            config: AppConfig::new(relay_url),
        };
        state.save()?;

        Ok(state)
    }

    /// Load existing state from the friends directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let friends_dir = Self::friends_dir(custom_path)?;

        if !friends_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let vault_path = friends_dir.join(VAULT_DIR_NAME);
        let config_path = friends_dir.join(CONFIG_FILE_NAME);

        if !vault_path.exists() {
            return Err(StateError::MissingFile(format!("{}/", VAULT_DIR_NAME)));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            friends_dir,
            vault_path,
            config_path,
            config,
        })
    }

    /// Write the current config back to disk
    pub fn save(&self) -> Result<(), StateError> {
        let config_toml = toml::to_string_pretty(&self.config)?;
        fs::write(&self.config_path, config_toml)?;
        Ok(())
    }

    pub fn crypto(&self) -> Result<IdentityCrypto<FileKeyVault>, StateError> {
        Ok(IdentityCrypto::new(FileKeyVault::open(&self.vault_path)?))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("friends directory not initialized. Run 'friends init' first")]
    NotInitialized,

    #[error("friends directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("not registered yet. Run 'friends register' first")]
    NotRegistered,

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

#[cfg(test)]
mod test {
    use super::*;

    fn relay() -> Url {
        Url::parse(DEFAULT_RELAY_URL).unwrap()
    }

    #[test]
    fn test_init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends");

        let state = AppState::init(Some(path.clone()), relay()).unwrap();
        assert!(state.vault_path.is_dir());
        assert!(!state.config.is_registered());

        let loaded = AppState::load(Some(path.clone())).unwrap();
        assert_eq!(loaded.config, state.config);

        assert!(matches!(
            AppState::init(Some(path), relay()),
            Err(StateError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_save_persists_registration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friends");

        let mut state = AppState::init(Some(path.clone()), relay()).unwrap();
        let assigned = Identity::provisional();
        state.config.identity = assigned;
        state.config.alias = Some("alice".into());
        state.save().unwrap();

        let loaded = AppState::load(Some(path)).unwrap();
        assert_eq!(loaded.config.identity, assigned);
        assert_eq!(loaded.config.alias.as_deref(), Some("alice"));
    }

    #[test]
    fn test_load_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AppState::load(Some(dir.path().join("missing"))),
            Err(StateError::NotInitialized)
        ));
    }
}
