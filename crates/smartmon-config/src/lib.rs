//! Operator-facing configuration for the smartmon daemon.
//!
//! The scheduler reads a fresh snapshot at the top of every iteration, and
//! operator commands (enable/disable) update the shared handle at any time,
//! so the configuration lives behind an [`arc_swap::ArcSwap`] rather than a
//! lock.

mod handle;

pub use handle::ConfigHandle;

use serde::{Deserialize, Serialize};

use smartmon_types::{Result, SmartError};

/// Configuration surface read by the scheduler and written by operator
/// commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartConfig {
    /// Whether scheduled scraping is enabled.
    #[serde(default)]
    pub active: bool,

    /// Daily anchor time-of-day for the scrape schedule, as "HHMM".
    #[serde(default = "default_begin_time")]
    pub begin_time: String,

    /// Repeat interval between scrapes, in seconds.
    #[serde(default = "default_scrape_frequency")]
    pub scrape_frequency: u64,

    /// Name of the failure-prediction model to run after each cycle.
    #[serde(default = "default_prediction_model")]
    pub prediction_model: String,

    /// What the prediction hook should do with a positive result.
    #[serde(default = "default_prediction_action")]
    pub prediction_action: String,

    /// Object namespace holding the per-device history objects.
    #[serde(default = "default_pool_name")]
    pub pool_name: String,
}

fn default_begin_time() -> String {
    "0000".to_string()
}

fn default_scrape_frequency() -> u64 {
    86_400
}

fn default_prediction_model() -> String {
    "trivial".to_string()
}

fn default_prediction_action() -> String {
    "warn".to_string()
}

fn default_pool_name() -> String {
    "smart_data".to_string()
}

/// Upper bound on the scrape interval: one year in seconds.
pub const MAX_SCRAPE_FREQUENCY_SECS: u64 = 365 * 24 * 60 * 60;

impl Default for SmartConfig {
    fn default() -> Self {
        Self {
            active: false,
            begin_time: default_begin_time(),
            scrape_frequency: default_scrape_frequency(),
            prediction_model: default_prediction_model(),
            prediction_action: default_prediction_action(),
            pool_name: default_pool_name(),
        }
    }
}

impl SmartConfig {
    /// Check structural validity of the configuration.
    ///
    /// `begin_time` must be four digits encoding a valid HHMM and the scrape
    /// frequency must be between one second and one year, keeping it far
    /// inside the range schedule arithmetic can step by. Schedule parsing
    /// itself is tolerant (the
    /// scheduler falls back to defaults on `ConfigInvalid`), but a config
    /// file that fails validation is rejected at load time.
    pub fn validate(&self) -> Result<()> {
        let (hh, mm) = parse_begin_time(&self.begin_time)?;
        debug_assert!(hh < 24 && mm < 60);
        if self.scrape_frequency == 0 {
            return Err(SmartError::ConfigInvalid(
                "scrape_frequency must be greater than zero".into(),
            ));
        }
        if self.scrape_frequency > MAX_SCRAPE_FREQUENCY_SECS {
            return Err(SmartError::ConfigInvalid(format!(
                "scrape_frequency {} exceeds the maximum of one year ({} seconds)",
                self.scrape_frequency, MAX_SCRAPE_FREQUENCY_SECS
            )));
        }
        if self.pool_name.is_empty() {
            return Err(SmartError::ConfigInvalid("pool_name must not be empty".into()));
        }
        Ok(())
    }
}

/// Parse an "HHMM" anchor string into (hour, minute).
pub fn parse_begin_time(s: &str) -> Result<(u32, u32)> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SmartError::ConfigInvalid(format!(
            "begin_time {s:?} is not a four-digit HHMM string"
        )));
    }
    let hh: u32 = s[..2].parse().unwrap_or(99);
    let mm: u32 = s[2..].parse().unwrap_or(99);
    if hh >= 24 || mm >= 60 {
        return Err(SmartError::ConfigInvalid(format!(
            "begin_time {s:?} is out of range"
        )));
    }
    Ok((hh, mm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = SmartConfig::default();
        assert!(!cfg.active);
        assert_eq!(cfg.begin_time, "0000");
        assert_eq!(cfg.scrape_frequency, 86_400);
        assert_eq!(cfg.prediction_model, "trivial");
        assert_eq!(cfg.prediction_action, "warn");
        assert_eq!(cfg.pool_name, "smart_data");
        cfg.validate().unwrap();
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let cfg: SmartConfig = toml::from_str("active = true").unwrap();
        assert!(cfg.active);
        assert_eq!(cfg.scrape_frequency, 86_400);
    }

    #[test]
    fn test_parse_begin_time() {
        assert_eq!(parse_begin_time("0000").unwrap(), (0, 0));
        assert_eq!(parse_begin_time("0215").unwrap(), (2, 15));
        assert_eq!(parse_begin_time("2359").unwrap(), (23, 59));
    }

    #[test]
    fn test_parse_begin_time_rejects_bad_input() {
        for bad in ["2400", "0060", "12:0", "abc", "", "00000"] {
            assert!(parse_begin_time(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_validate_rejects_zero_frequency() {
        let cfg = SmartConfig {
            scrape_frequency: 0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(SmartError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_frequency() {
        for frequency in [
            MAX_SCRAPE_FREQUENCY_SECS + 1,
            100_000_000_000_000_000,
            u64::MAX,
        ] {
            let cfg = SmartConfig {
                scrape_frequency: frequency,
                ..Default::default()
            };
            assert!(
                matches!(cfg.validate(), Err(SmartError::ConfigInvalid(_))),
                "accepted scrape_frequency {frequency}"
            );
        }
        let cfg = SmartConfig {
            scrape_frequency: MAX_SCRAPE_FREQUENCY_SECS,
            ..Default::default()
        };
        cfg.validate().unwrap();
    }

    #[test]
    fn test_serde_roundtrip() {
        let cfg = SmartConfig {
            active: true,
            begin_time: "0200".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SmartConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
