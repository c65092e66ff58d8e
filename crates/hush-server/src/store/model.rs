use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

/// A stored secret. Only `remaining_views` changes after creation.
/// The payload is wiped when any copy of the record is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    /// Opaque handle (UUID string) used as the lookup key.
    #[serde(rename = "hash")]
    pub handle: String,
    /// The protected payload.
    #[serde(rename = "secretText")]
    pub text: String,
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
    /// Reads strictly after this instant are refused. Never later than
    /// 9999-12-31T23:59:59Z, so it always renders as RFC 3339.
    #[zeroize(skip)]
    pub expires_at: DateTime<Utc>,
    /// Successful reads left. Decremented by one per accepted read.
    pub remaining_views: i32,
}

impl Secret {
    /// True once `expires_at` lies strictly before `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// True once no views remain.
    pub fn is_exhausted(&self) -> bool {
        self.remaining_views <= 0
    }
}
