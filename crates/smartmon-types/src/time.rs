use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SmartError};

/// Storage key format for history entries: fixed-width and zero-padded so
/// lexical string order equals chronological order.
pub const SERIES_TS_FORMAT: &str = "%Y%m%d-%H%M%S";

/// A history-entry timestamp with one-second resolution.
///
/// Business logic works with this structured value; the lexical text form is
/// produced and parsed only at the storage boundary ([`Self::to_key`] /
/// [`Self::parse_key`]). Two scrapes within the same second map to the same
/// key and the later write wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesTimestamp {
    inner: DateTime<Utc>,
}

impl SeriesTimestamp {
    /// The current wall-clock time, truncated to the storage resolution.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Truncate an arbitrary instant to the storage resolution.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let secs = dt.timestamp();
        let truncated = DateTime::<Utc>::from_timestamp(secs, 0)
            .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH);
        Self { inner: truncated }
    }

    /// Access the underlying instant.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.inner
    }

    /// Render the lexically-sortable storage key.
    pub fn to_key(&self) -> String {
        self.inner.format(SERIES_TS_FORMAT).to_string()
    }

    /// Parse a storage key back into a structured timestamp.
    pub fn parse_key(key: &str) -> Result<Self> {
        let naive = NaiveDateTime::parse_from_str(key, SERIES_TS_FORMAT)
            .map_err(|e| SmartError::Serialization(format!("bad timestamp key {key:?}: {e}")))?;
        Ok(Self {
            inner: naive.and_utc(),
        })
    }
}

impl fmt::Display for SeriesTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_key())
    }
}
