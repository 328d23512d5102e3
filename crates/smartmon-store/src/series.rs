//! The per-device history contract layered over an [`ObjectStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use smartmon_types::{Reading, Result, SeriesName, SeriesTimestamp};

use crate::object::ObjectStore;

/// One entry that could not be decoded while dumping a series.
///
/// Decode failures are skipped rather than fatal, so a single corrupt entry
/// never blocks an operator from reading a long history; the failures are
/// still surfaced for diagnostics instead of silently discarded.
#[derive(Debug, Clone)]
pub struct DecodeFailure {
    /// The raw storage key of the bad entry.
    pub key: String,
    /// Why it could not be decoded.
    pub reason: String,
}

/// The decoded contents of one series object.
#[derive(Debug, Clone, Default)]
pub struct SeriesDump {
    /// Entries in chronological order.
    pub entries: BTreeMap<SeriesTimestamp, Reading>,
    /// Entries that were present but undecodable.
    pub skipped: Vec<DecodeFailure>,
}

impl SeriesDump {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Durable per-device append-only history.
///
/// Exclusively owns the series objects in its namespace: the orchestrator
/// only appends through it, the query engine only reads through it, and
/// nothing deletes or compacts history.
#[derive(Clone)]
pub struct TimeSeriesStore {
    store: Arc<dyn ObjectStore>,
}

impl TimeSeriesStore {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Append one reading under the given timestamp.
    ///
    /// Creates the series object on first write; an append at an existing
    /// timestamp key overwrites that entry (the second value is retained).
    pub async fn append_entry(
        &self,
        series: &SeriesName,
        ts: SeriesTimestamp,
        reading: &Reading,
    ) -> Result<()> {
        let encoded = reading.to_bytes()?;
        self.store
            .put_entry(series.as_str(), &ts.to_key(), &encoded)
            .await
    }

    /// Read back and decode every entry of a series.
    ///
    /// An empty or absent series yields an empty dump; only a failing backend
    /// read is an error. Entries whose key or value fail to decode are
    /// skipped and reported in [`SeriesDump::skipped`].
    pub async fn dump_series(&self, series: &SeriesName) -> Result<SeriesDump> {
        let raw = self.store.read_object(series.as_str()).await?;

        let mut dump = SeriesDump::default();
        for (key, bytes) in raw {
            let ts = match SeriesTimestamp::parse_key(&key) {
                Ok(ts) => ts,
                Err(e) => {
                    dump.skipped.push(DecodeFailure {
                        key,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            match Reading::from_bytes(&bytes) {
                Ok(reading) => {
                    dump.entries.insert(ts, reading);
                }
                Err(e) => {
                    dump.skipped.push(DecodeFailure {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !dump.skipped.is_empty() {
            tracing::warn!(
                series = %series,
                skipped = dump.skipped.len(),
                "Skipped undecodable history entries"
            );
        }
        Ok(dump)
    }

    /// Enumerate the series currently present in the namespace.
    pub async fn list_series_names(&self) -> Result<Vec<SeriesName>> {
        let names = self.store.list_objects().await?;
        Ok(names.into_iter().map(SeriesName::from_raw).collect())
    }

    /// The most recent entry timestamp, or `None` for an empty series.
    pub async fn latest_timestamp(&self, series: &SeriesName) -> Result<Option<SeriesTimestamp>> {
        match self.store.last_key(series.as_str()).await? {
            Some(key) => Ok(Some(SeriesTimestamp::parse_key(&key)?)),
            None => Ok(None),
        }
    }

    /// Point lookup of the entry at an exact timestamp.
    pub async fn entry_at(
        &self,
        series: &SeriesName,
        ts: SeriesTimestamp,
    ) -> Result<Option<Reading>> {
        match self.store.get_entry(series.as_str(), &ts.to_key()).await? {
            Some(bytes) => Ok(Some(Reading::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }
}
