//! Read-side access to stored SMART history.
//!
//! The query engine only reads; it is driven by on-demand operator requests,
//! never by the scheduler.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use smartmon_store::TimeSeriesStore;
use smartmon_types::{Reading, Result, SeriesName};

/// `dump_all` result: the series that dumped successfully, plus per-series
/// failures that were recorded without aborting enumeration.
#[derive(Debug, Default)]
pub struct FleetDump {
    /// Series name -> document keyed by timestamp.
    pub series: BTreeMap<SeriesName, Value>,
    /// Series whose backend read failed, with the failure text.
    pub errors: BTreeMap<SeriesName, String>,
}

/// Read-only query operations over the time-series store.
#[derive(Clone)]
pub struct QueryEngine {
    store: TimeSeriesStore,
}

impl QueryEngine {
    pub fn new(store: TimeSeriesStore) -> Self {
        Self { store }
    }

    /// Dump one series as a single JSON document keyed by timestamp.
    ///
    /// Undecodable entries were already skipped (and counted) by the store;
    /// the skip count is logged here so a dump of a partly-corrupt history
    /// still succeeds visibly rather than silently.
    pub async fn dump_one(&self, series: &SeriesName) -> Result<Value> {
        let dump = self.store.dump_series(series).await?;
        if !dump.skipped.is_empty() {
            tracing::warn!(
                series = %series,
                skipped = dump.skipped.len(),
                "Dump skipped undecodable entries"
            );
        }

        let mut doc = Map::new();
        for (ts, reading) in dump.entries {
            doc.insert(ts.to_key(), reading.into_value());
        }
        Ok(Value::Object(doc))
    }

    /// Dump every series in the namespace.
    ///
    /// One series failing to read is recorded in [`FleetDump::errors`] and
    /// does not abort the others.
    pub async fn dump_all(&self) -> Result<FleetDump> {
        let names = self.store.list_series_names().await?;

        let mut out = FleetDump::default();
        for name in names {
            match self.dump_one(&name).await {
                Ok(doc) => {
                    out.series.insert(name, doc);
                }
                Err(e) => {
                    tracing::warn!(series = %name, error = %e, "Failed to dump series");
                    out.errors.insert(name, e.to_string());
                }
            }
        }
        Ok(out)
    }

    /// Enumerate the series currently present.
    ///
    /// This is the set the prediction hook runs over.
    pub async fn series_names(&self) -> Result<Vec<SeriesName>> {
        self.store.list_series_names().await
    }

    /// The most recent reading of a series, or `None` when the series has no
    /// entries (explicitly distinct from an error).
    pub async fn latest(&self, series: &SeriesName) -> Result<Option<Reading>> {
        match self.store.latest_timestamp(series).await? {
            Some(ts) => self.store.entry_at(series, ts).await,
            None => Ok(None),
        }
    }
}
