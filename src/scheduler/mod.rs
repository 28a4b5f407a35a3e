//! Daily timer jobs for the background maintenance sweeps.
//!
//! Two jobs run without external trigger: the overdue sweep (midnight by
//! default) and the automatic notification generation (08:00 by default).
//! Each job is guarded against overlapping runs: a tick that fires while
//! the previous run is still in flight logs a warning and skips, so a
//! stuck run delays nothing and never stacks.
//!
//! Wiring happens at process start:
//!
//! ```ignore
//! let config = SchedulerConfig::from_env();
//! spawn_daily("overdue-sweep", config.sweep_at, move || {
//!     let sweeper = Arc::clone(&sweeper);
//!     async move {
//!         sweeper.run().await;
//!     }
//! });
//! ```

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// A fixed local time of day at which a job fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTime {
    hour: u32,
    minute: u32,
}

/// Error returned while parsing `HH:MM` trigger times.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid trigger time '{0}', expected HH:MM")]
pub struct ParseDailyTimeError(pub String);

impl DailyTime {
    /// Creates a trigger time from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`ParseDailyTimeError`] when the values are out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ParseDailyTimeError> {
        if hour > 23 || minute > 59 {
            return Err(ParseDailyTimeError(format!("{hour}:{minute}")));
        }
        Ok(Self { hour, minute })
    }

    /// Parses an `HH:MM` string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseDailyTimeError`] when the input does not match the
    /// format.
    pub fn parse(value: &str) -> Result<Self, ParseDailyTimeError> {
        let error = || ParseDailyTimeError(value.to_owned());
        let (raw_hour, raw_minute) = value.trim().split_once(':').ok_or_else(error)?;
        let hour: u32 = raw_hour.parse().map_err(|_| error())?;
        let minute: u32 = raw_minute.parse().map_err(|_| error())?;
        Self::new(hour, minute).map_err(|_| error())
    }

    /// Returns the hour component.
    #[must_use]
    pub const fn hour(self) -> u32 {
        self.hour
    }

    /// Returns the minute component.
    #[must_use]
    pub const fn minute(self) -> u32 {
        self.minute
    }

    fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl std::fmt::Display for DailyTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Trigger times for the two scheduled jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// When the overdue sweep fires.
    pub sweep_at: DailyTime,
    /// When automatic notification generation fires.
    pub notifications_at: DailyTime,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_at: DailyTime { hour: 0, minute: 0 },
            notifications_at: DailyTime { hour: 8, minute: 0 },
        }
    }
}

impl SchedulerConfig {
    /// Builds the configuration from `BITACORA_SWEEP_AT` and
    /// `BITACORA_NOTIFY_AT`, falling back to the defaults for absent or
    /// malformed values. A malformed value is logged, consistent with the
    /// lenient-field policy elsewhere in the crate.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sweep_at: env_time("BITACORA_SWEEP_AT", defaults.sweep_at),
            notifications_at: env_time("BITACORA_NOTIFY_AT", defaults.notifications_at),
        }
    }
}

fn env_time(name: &str, fallback: DailyTime) -> DailyTime {
    match std::env::var(name) {
        Ok(raw) => DailyTime::parse(&raw).unwrap_or_else(|err| {
            warn!(var = name, error = %err, "ignoring malformed trigger time");
            fallback
        }),
        Err(_) => fallback,
    }
}

/// Computes how long to sleep until the next occurrence of `at`.
///
/// When the trigger time has already passed today (or is exactly now), the
/// next occurrence is tomorrow.
#[must_use]
pub fn next_delay(now: NaiveDateTime, at: DailyTime) -> Duration {
    let mut target = now.date().and_time(at.as_naive_time());
    if target <= now {
        target += TimeDelta::days(1);
    }
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// Spawns a job that fires once per day at the given local time.
///
/// The job future is spawned onto the runtime while an overlap guard is
/// held; if the next tick arrives before the previous run released the
/// guard, that tick is skipped.
pub fn spawn_daily<F, Fut>(name: &'static str, at: DailyTime, job: F) -> tokio::task::JoinHandle<()>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let guard = Arc::new(tokio::sync::Mutex::new(()));
    tokio::spawn(async move {
        loop {
            let delay = next_delay(Local::now().naive_local(), at);
            debug!(job = name, delay_secs = delay.as_secs(), "scheduling next run");
            tokio::time::sleep(delay).await;

            match Arc::clone(&guard).try_lock_owned() {
                Ok(permit) => {
                    let run = job();
                    tokio::spawn(async move {
                        run.await;
                        drop(permit);
                    });
                }
                Err(_) => {
                    warn!(job = name, "previous run still in progress; skipping this trigger");
                }
            }
        }
    })
}
