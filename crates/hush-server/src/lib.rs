pub mod handlers;
pub mod server;
pub mod store;

/// Shared application state threaded through axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: store::SecretStore,
}

pub use server::{router, run, ServerConfig};
pub use store::{Secret, SecretStore, StoreError};
