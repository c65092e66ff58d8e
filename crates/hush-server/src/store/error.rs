use thiserror::Error;

/// Failures returned by [`SecretStore`](super::SecretStore) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Negative view count or TTL on creation.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The handle source failed (or produced a handle already in use).
    /// Nothing was stored; creation may be retried.
    #[error("could not generate secret handle: {0}")]
    IdentifierGeneration(String),

    #[error("secret not found")]
    NotFound,

    #[error("secret has expired")]
    Expired,

    #[error("no remaining views for secret")]
    ViewsExhausted,
}
