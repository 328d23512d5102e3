//! Next-run arithmetic for the daily-anchored repeat schedule.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use smartmon_config::{parse_begin_time, SmartConfig};
use smartmon_types::{Result, SmartError};

/// A parsed schedule: the daily anchor time-of-day and the repeat interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    begin: NaiveTime,
    frequency: Duration,
}

impl ScheduleSpec {
    /// Parse the schedule out of the configuration.
    pub fn try_from_config(config: &SmartConfig) -> Result<Self> {
        let (hh, mm) = parse_begin_time(&config.begin_time)?;
        // Range-checked by parse_begin_time.
        let begin = NaiveTime::from_hms_opt(hh, mm, 0)
            .ok_or_else(|| SmartError::ConfigInvalid(format!("begin_time {hh:02}{mm:02}")))?;
        if config.scrape_frequency == 0 {
            return Err(SmartError::ConfigInvalid(
                "scrape_frequency must be greater than zero".into(),
            ));
        }
        // Out-of-range values would otherwise panic in chrono or wrap
        // negative and make the step-forward loop diverge.
        let frequency = i64::try_from(config.scrape_frequency)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                SmartError::ConfigInvalid(format!(
                    "scrape_frequency {} is out of range",
                    config.scrape_frequency
                ))
            })?;
        Ok(Self { begin, frequency })
    }

    /// Parse the schedule, falling back to the documented defaults when the
    /// configuration cannot be parsed.
    pub fn from_config(config: &SmartConfig) -> Self {
        match Self::try_from_config(config) {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(error = %e, "Unparseable schedule, using defaults");
                Self::default()
            }
        }
    }

    /// The first instant `>= now` that equals the anchor on some calendar day
    /// plus an integer multiple of the frequency.
    ///
    /// The anchor is first placed on today's date and stepped back one day if
    /// it lies in the future, so stepping forward always starts at or before
    /// `now`. An instant exactly equal to `now` is already due (zero sleep).
    pub fn next_run_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut next = now.date_naive().and_time(self.begin).and_utc();
        if next > now {
            next -= Duration::days(1);
        }
        while next < now {
            next += self.frequency;
        }
        next
    }

    /// How long to sleep from `now` until the next run.
    pub fn sleep_from(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.next_run_at(now) - now).to_std().unwrap_or_default()
    }
}

impl Default for ScheduleSpec {
    /// Documented defaults: anchor "0000", frequency one day.
    fn default() -> Self {
        Self {
            begin: NaiveTime::MIN,
            frequency: Duration::days(1),
        }
    }
}
