use rand::{rngs::OsRng, RngCore};

use super::error::StoreError;

/// Produces fresh opaque handles for new secrets.
pub trait HandleSource: Send + Sync {
    fn next_handle(&self) -> Result<String, StoreError>;
}

/// 128 random bits from the OS, rendered as a UUID v4 string.
/// RNG failure is surfaced instead of panicking.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsHandleSource;

impl HandleSource for OsHandleSource {
    fn next_handle(&self) -> Result<String, StoreError> {
        let mut bytes = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| StoreError::IdentifierGeneration(e.to_string()))?;
        Ok(uuid::Builder::from_random_bytes(bytes)
            .into_uuid()
            .to_string())
    }
}
