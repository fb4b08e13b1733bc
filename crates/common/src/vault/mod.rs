//! Secure storage for identity and session key material
//!
//! Everything above this module treats a vault as opaque get/put/delete storage keyed by
//! label. Two backends ship here; platform secure storage can be plugged in by
//! implementing [`KeyVault`].

mod fs;
mod memory;
mod provider;

pub use fs::FileKeyVault;
pub use memory::MemoryKeyVault;
pub use provider::{KeyClass, KeyVault, PutMode, VaultError};
