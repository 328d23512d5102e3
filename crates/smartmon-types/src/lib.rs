//! Core types shared across the smartmon crates.
//!
//! Defines the error taxonomy, the identifier newtypes used to address
//! nodes and devices, the lexically-sortable series timestamp, and the
//! opaque SMART [`Reading`] document.

mod error;
mod ids;
mod reading;
mod time;

pub use error::{Result, SmartError};
pub use ids::{DeviceKey, NodeId, SeriesName};
pub use reading::Reading;
pub use time::{SeriesTimestamp, SERIES_TS_FORMAT};
