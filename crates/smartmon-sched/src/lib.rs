//! Scrape scheduling.
//!
//! [`ScheduleSpec`] is the pure arithmetic: given a daily anchor time-of-day
//! and a repeat interval, compute the next run instant. [`Scheduler`] is the
//! long-lived loop that sleeps until that instant (or until woken by a
//! configuration change) and then runs one scrape-and-predict cycle.

mod scheduler;
mod spec;

pub use scheduler::{Scheduler, SchedulerControl, SchedulerHandle};
pub use spec::ScheduleSpec;
