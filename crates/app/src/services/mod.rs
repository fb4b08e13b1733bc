//! Relay-facing services
//!
//! Every service wraps a clone of one [`relay::ApiClient`], so they all share the
//! session cookie set by [`SessionManagement`].

pub mod friends;
pub mod handshake;
pub mod key_update;
pub mod location;
pub mod registration;
pub mod session;
pub mod shared_data;

pub use friends::{FriendError, FriendService};
pub use handshake::{HandshakeError, HandshakeService, HandshakeState};
pub use key_update::KeyUpdateService;
pub use location::{LocationSharing, LocationSharingError};
pub use registration::{Registration, RegistrationError};
pub use session::{alias_hash, SessionError, SessionManagement};
pub use shared_data::{SharedDataError, SharedDataService};
