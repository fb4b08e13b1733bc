/**
 * Strongly typed identifiers for users,
 *  provisional or relay-assigned.
 */
pub mod identity;
/**
 * Cryptographic types and operations.
 *  - RSA identity keypairs
 *  - AES-GCM session keys
 *  - Session key wrapping for friends
 */
pub mod crypto;
/**
 * Key storage abstraction and the
 *  in-memory and on-disk backends.
 */
pub mod vault;
/**
 * Per-identity key lifecycle on top of a vault:
 *  generation, migration, friend keys and
 *  payload encryption.
 */
pub mod identity_crypto;
/**
 * Relay record categories and their capabilities.
 */
pub mod category;
pub mod location;

pub mod prelude {
    pub use crate::category::SharedItemCategory;
    pub use crate::crypto::{PublicKey, SecretKey, SessionKey, WrappedSessionKey};
    pub use crate::identity::Identity;
    pub use crate::identity_crypto::{IdentityCrypto, IdentityCryptoError};
    pub use crate::location::Location;
    pub use crate::vault::{FileKeyVault, KeyClass, KeyVault, MemoryKeyVault, PutMode, VaultError};
}
