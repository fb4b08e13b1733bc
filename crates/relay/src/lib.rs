// Service modules (relay functionality)
pub mod http_server;
pub mod process;
pub mod service_config;
pub mod state;

// Re-exports for consumers (the friends client, tests)
pub use http_server::api::client::{ApiClient, ApiError, ApiRequest};
pub use process::{spawn_service, start_service, ShutdownHandle};
pub use service_config::Config as ServiceConfig;
pub use state::State as RelayState;
