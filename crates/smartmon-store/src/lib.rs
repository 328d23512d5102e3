//! Append-only per-device time-series storage.
//!
//! [`ObjectStore`] is the seam to the storage substrate: a namespace of named
//! objects, each holding an ordered string-key to bytes map. [`MemObjectStore`]
//! is the always-available in-memory backend; a RADOS-omap-style backend would
//! implement the same trait.
//!
//! [`TimeSeriesStore`] layers the SMART history contract on top: one object
//! per (host, device) pair, one entry per formatted timestamp.

mod mem;
mod object;
mod series;

pub use mem::MemObjectStore;
pub use object::ObjectStore;
pub use series::{DecodeFailure, SeriesDump, TimeSeriesStore};
