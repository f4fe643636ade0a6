//! When scheduled tasks fire

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use std::time::Duration;

use crate::errors::{DomainError, DomainResult};

/// Seconds in one day
pub const ONE_DAY: Duration = Duration::from_secs(86_400);

/// A recurring firing plan anchored to wall-clock time
pub trait Schedule: Send + Sync {
    /// First instant the task should fire at, given the current time
    fn next_fire_time(&self, now: DateTime<Utc>) -> DateTime<Utc>;

    /// Interval between firings after the first
    fn period(&self) -> Duration;

    /// How long to wait from `now` until the first firing
    fn initial_delay(&self, now: DateTime<Utc>) -> Duration {
        (self.next_fire_time(now) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Fires at a UTC time of day, then every `period`
///
/// When today's time of day has already passed (or is exactly now) the first
/// firing is immediate, so the task runs at least once today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    time_of_day: NaiveTime,
    period: Duration,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32, second: u32, period: Duration) -> DomainResult<Self> {
        let time_of_day = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
            DomainError::Validation {
                message: format!("Invalid time of day {:02}:{:02}:{:02}", hour, minute, second),
            }
        })?;
        if period.is_zero() {
            return Err(DomainError::Validation {
                message: "Schedule period must be positive".to_string(),
            });
        }
        Ok(Self { time_of_day, period })
    }

    /// Once a day at `hour:minute:second`
    pub fn daily(hour: u32, minute: u32, second: u32) -> DomainResult<Self> {
        Self::new(hour, minute, second, ONE_DAY)
    }

    pub fn time_of_day(&self) -> NaiveTime {
        self.time_of_day
    }

    /// The scheduled instant on the same UTC date as `now`
    pub fn scheduled_time_on(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        Utc.from_utc_datetime(&now.date_naive().and_time(self.time_of_day))
    }
}

impl Schedule for DailySchedule {
    fn next_fire_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let scheduled = self.scheduled_time_on(now);
        if scheduled <= now {
            now
        } else {
            scheduled
        }
    }

    fn period(&self) -> Duration {
        self.period
    }
}
