// Client-side protocol: relay services and local app state
pub mod services;
pub mod state;

pub use state::{AppConfig, AppState, StateError};
