//! Cryptographic primitives for Friends
//!
//! The scheme is a plain asymmetric/symmetric hybrid:
//!
//! - **Identity**: every user owns an RSA-2048 keypair (`SecretKey`/`PublicKey`). The public
//!   half is uploaded at registration; the private half never leaves the key vault.
//! - **Payloads**: every user owns one AES-256-GCM `SessionKey` that seals everything they
//!   share.
//! - **Key transport**: to let a friend read our payloads we RSA-PKCS1 encrypt our session
//!   key under their public key, producing a `WrappedSessionKey`, and push it to the relay.
//!
//! The friend recovers our session key by:
//! 1. Unwrapping the `WrappedSessionKey` attached to our relay item with their private key
//! 2. Opening the combined AES-GCM box with the recovered key

mod keys;
mod session_key;
mod wrapped_key;

pub use keys::{KeyError, PublicKey, SecretKey, RSA_KEY_BITS, RSA_MODULUS_SIZE};
pub use session_key::{SessionKey, SessionKeyError, NONCE_SIZE, SESSION_KEY_SIZE, TAG_SIZE};
pub use wrapped_key::{WrappedKeyError, WrappedSessionKey, WRAPPED_KEY_SIZE};
