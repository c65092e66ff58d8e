use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Months, NaiveDate, TimeDelta, Utc};
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::error::StoreError;
use super::handle::{HandleSource, OsHandleSource};
use super::model::Secret;

/// A TTL of zero is stored as this far-future expiry rather than "never".
const NO_EXPIRY_YEARS: u32 = 100;

/// Thread-safe handle to an in-memory secret collection.
///
/// Clones share the same collection. Every operation runs under one
/// mutex, so reads on a given handle are totally ordered and the
/// check-then-decrement in [`read_secret`](Self::read_secret) is atomic.
///
/// Expired and exhausted records are never removed; they stay in the map
/// and keep refusing reads for the life of the process.
#[derive(Clone)]
pub struct SecretStore {
    secrets: Arc<Mutex<HashMap<String, Secret>>>,
    clock: Arc<dyn Clock>,
    handles: Arc<dyn HandleSource>,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore {
    /// Store backed by the wall clock and OS randomness.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SystemClock), Arc::new(OsHandleSource))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_parts(clock, Arc::new(OsHandleSource))
    }

    pub fn with_parts(clock: Arc<dyn Clock>, handles: Arc<dyn HandleSource>) -> Self {
        Self {
            secrets: Arc::new(Mutex::new(HashMap::new())),
            clock,
            handles,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Secret>> {
        // Every critical section leaves the map consistent, so a panic
        // elsewhere never leaves a half-applied update behind.
        self.secrets.lock().unwrap_or_else(|e| {
            warn!("secret store lock was poisoned; recovering");
            e.into_inner()
        })
    }

    /// Store `text` under a fresh handle, readable `max_views` times for
    /// `ttl_minutes` minutes (0 = effectively unlimited).
    /// Returns a copy of the stored record.
    pub fn create_secret(
        &self,
        text: &str,
        max_views: i32,
        ttl_minutes: i64,
    ) -> Result<Secret, StoreError> {
        if ttl_minutes < 0 {
            return Err(StoreError::InvalidArgument("ttl minutes can't be negative"));
        }
        if max_views < 0 {
            return Err(StoreError::InvalidArgument("view count can't be negative"));
        }

        let handle = self.handles.next_handle()?;
        let now = self.clock.now();

        let secret = Secret {
            handle: handle.clone(),
            text: text.to_owned(),
            created_at: now,
            expires_at: expiry(now, ttl_minutes),
            remaining_views: max_views,
        };

        match self.lock().entry(handle) {
            Entry::Occupied(slot) => {
                return Err(StoreError::IdentifierGeneration(format!(
                    "handle collision on {}",
                    slot.key()
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(secret.clone());
            }
        }

        debug!(
            handle = %secret.handle,
            max_views,
            expires_at = %secret.expires_at,
            "stored secret"
        );
        Ok(secret)
    }

    /// Consume one view of the secret under `handle`.
    ///
    /// On success the returned record carries the payload and the
    /// remaining view count *after* this read. On failure nothing changes.
    pub fn read_secret(&self, handle: &str) -> Result<Secret, StoreError> {
        let mut secrets = self.lock();
        let now = self.clock.now();

        let secret = secrets.get_mut(handle).ok_or(StoreError::NotFound)?;
        if secret.is_expired(now) {
            debug!(%handle, "read refused: expired");
            return Err(StoreError::Expired);
        }
        if secret.is_exhausted() {
            debug!(%handle, "read refused: views exhausted");
            return Err(StoreError::ViewsExhausted);
        }

        secret.remaining_views -= 1;
        debug!(%handle, remaining_views = secret.remaining_views, "secret read");
        Ok(secret.clone())
    }

    /// Number of records held, including expired and exhausted ones.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Latest expiry we hand out: the last second of year 9999, the end of
/// the RFC 3339 range.
fn latest_expiry() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map_or(DateTime::<Utc>::MAX_UTC, |at| at.and_utc())
}

/// Absolute expiry for a TTL in minutes. Saturates at [`latest_expiry`]
/// instead of overflowing.
fn expiry(now: DateTime<Utc>, ttl_minutes: i64) -> DateTime<Utc> {
    let at = if ttl_minutes == 0 {
        now.checked_add_months(Months::new(NO_EXPIRY_YEARS * 12))
    } else {
        TimeDelta::try_minutes(ttl_minutes).and_then(|ttl| now.checked_add_signed(ttl))
    };
    let latest = latest_expiry();
    at.map_or(latest, |at| at.min(latest))
}
