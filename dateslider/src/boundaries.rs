//! Global constraints shared by every scroller of a picker chain.
//!
//! ## Usage
//!
//! Build a [`TimeBoundaries`] snapshot once, refine it with the `with_*`
//! methods and hand it to a [`PickerChain`](crate::PickerChain). A snapshot is
//! never mutated in place: each `with_*` call validates its input and returns
//! a new value, so scrollers holding an older `Arc` keep a consistent view
//! until the chain redistributes the replacement.

use chrono_tz::Tz;
use derive_setters::Setters;

use crate::{
    EpochMillis,
    error::ConfigError,
    resolver::calendar::{self, SECONDS_PER_HOUR},
};

/// Largest accepted minute interval.
pub const MAX_MINUTE_INTERVAL: u32 = 120;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Absolute bounds, minute granularity and hour-of-day window for a chain.
///
/// * `min_time` / `max_time`: optional absolute bounds in epoch milliseconds.
/// * `minute_interval`: granularity of minute and hour slots, in minutes.
/// * `start_hour` / `end_hour`: optional operating window. The end hour is
///   inclusive of its whole hour, so `end_hour = 17` allows times up to 17:59.
/// * `timezone`: the calendar zone all slot math runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeBoundaries {
    min_time: Option<EpochMillis>,
    max_time: Option<EpochMillis>,
    minute_interval: u32,
    start_hour: Option<u32>,
    end_hour: Option<u32>,
    timezone: Tz,
}

impl Default for TimeBoundaries {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl TimeBoundaries {
    /// Unbounded configuration with a one-minute interval in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self {
            min_time: None,
            max_time: None,
            minute_interval: 1,
            start_hour: None,
            end_hour: None,
            timezone,
        }
    }

    /// Lower absolute bound, if any.
    pub fn min_time(&self) -> Option<EpochMillis> {
        self.min_time
    }

    /// Upper absolute bound, if any.
    pub fn max_time(&self) -> Option<EpochMillis> {
        self.max_time
    }

    /// Minute granularity used to align minute and hour slots.
    pub fn minute_interval(&self) -> u32 {
        self.minute_interval
    }

    /// First allowed hour of each day, if restricted.
    pub fn start_hour(&self) -> Option<u32> {
        self.start_hour
    }

    /// Last allowed hour of each day (inclusive), if restricted.
    pub fn end_hour(&self) -> Option<u32> {
        self.end_hour
    }

    /// Calendar zone used for every field computation.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Half of the minute interval in milliseconds.
    ///
    /// Slot validity ranges are shifted back by this amount so that adjacent
    /// slots meet at the rounding midpoint used by minute alignment.
    pub fn half_interval_millis(&self) -> i64 {
        i64::from(self.minute_interval) * 30_000
    }

    /// Returns a copy with a new lower bound.
    pub fn with_min_time(&self, min_time: Option<EpochMillis>) -> Result<Self, ConfigError> {
        check_order(min_time, self.max_time)?;
        Ok(Self {
            min_time,
            ..self.clone()
        })
    }

    /// Returns a copy with a new upper bound.
    pub fn with_max_time(&self, max_time: Option<EpochMillis>) -> Result<Self, ConfigError> {
        check_order(self.min_time, max_time)?;
        Ok(Self {
            max_time,
            ..self.clone()
        })
    }

    /// Returns a copy with a new minute interval.
    pub fn with_minute_interval(&self, minute_interval: u32) -> Result<Self, ConfigError> {
        check_minute_interval(minute_interval)?;
        Ok(Self {
            minute_interval,
            ..self.clone()
        })
    }

    /// Returns a copy with a new hour-of-day window.
    ///
    /// Either end may be left open. When both are set, `start_hour` must be
    /// strictly before `end_hour`.
    pub fn with_hours(
        &self,
        start_hour: Option<u32>,
        end_hour: Option<u32>,
    ) -> Result<Self, ConfigError> {
        check_hours(start_hour, end_hour)?;
        Ok(Self {
            start_hour,
            end_hour,
            ..self.clone()
        })
    }

    /// Returns a copy computed in another timezone.
    pub fn with_timezone(&self, timezone: Tz) -> Self {
        Self {
            timezone,
            ..self.clone()
        }
    }

    /// Re-checks every invariant, e.g. after deserializing a snapshot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_minute_interval(self.minute_interval)?;
        check_hours(self.start_hour, self.end_hour)?;
        check_order(self.min_time, self.max_time)
    }

    /// Clamps `instant` into `[min_time, max_time]`.
    pub fn bind_to_min_max(&self, instant: EpochMillis) -> EpochMillis {
        let instant = match self.min_time {
            Some(min) if instant < min => min,
            _ => instant,
        };
        match self.max_time {
            Some(max) if instant > max => max,
            _ => instant,
        }
    }

    /// Applies the fields marked as changed in `overrides`.
    ///
    /// The hour window is re-aligned to the (possibly new) minute interval:
    /// the start hour rounds to the nearest interval boundary, the end hour
    /// to the boundary that closes the last full interval before it. Bounds
    /// are pulled into the hour window of their own day before they apply.
    pub fn merge(&self, overrides: &BoundaryOverrides) -> Result<Self, ConfigError> {
        let mut merged = self.clone();
        if let Some(minute_interval) = overrides.minute_interval {
            check_minute_interval(minute_interval)?;
            merged.minute_interval = minute_interval;
        }

        let start_hour = match overrides.start_hour {
            Some(hour) => {
                check_hour(hour)?;
                Some(merged.aligned_start_hour(hour))
            }
            None => merged.start_hour,
        };
        let end_hour = match overrides.end_hour {
            Some(hour) => {
                check_hour(hour)?;
                Some(merged.aligned_end_hour(hour))
            }
            None => merged.end_hour,
        };
        check_hours(start_hour, end_hour)?;
        merged.start_hour = start_hour;
        merged.end_hour = end_hour;

        if let Some(min_time) = overrides.min_time {
            merged.min_time = Some(calendar::clamp_to_hour_window(&merged, min_time));
        }
        if let Some(max_time) = overrides.max_time {
            merged.max_time = Some(calendar::clamp_to_hour_window(&merged, max_time));
        }
        check_order(merged.min_time, merged.max_time)?;
        Ok(merged)
    }

    fn aligned_start_hour(&self, hour: u32) -> u32 {
        let seconds = i64::from(hour) * SECONDS_PER_HOUR;
        let aligned = calendar::align_seconds_of_day(seconds, self.minute_interval);
        ((aligned / SECONDS_PER_HOUR) as u32).min(23)
    }

    // The window closes at the end of `hour`, so the interval boundary that
    // matters is the one at `hour + 1`.
    fn aligned_end_hour(&self, hour: u32) -> u32 {
        let seconds = i64::from(hour + 1) * SECONDS_PER_HOUR;
        let aligned = calendar::align_seconds_of_day(seconds, self.minute_interval);
        ((aligned / SECONDS_PER_HOUR) as u32).saturating_sub(1).min(23)
    }
}

/// Partial update for [`TimeBoundaries`]; `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Setters)]
#[setters(strip_option)]
pub struct BoundaryOverrides {
    /// New lower bound.
    pub min_time: Option<EpochMillis>,
    /// New upper bound.
    pub max_time: Option<EpochMillis>,
    /// New minute interval.
    pub minute_interval: Option<u32>,
    /// New first hour of the day.
    pub start_hour: Option<u32>,
    /// New last hour of the day.
    pub end_hour: Option<u32>,
}

impl BoundaryOverrides {
    /// Returns `true` if no field is marked as changed.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn check_minute_interval(minute_interval: u32) -> Result<(), ConfigError> {
    if !(1..=MAX_MINUTE_INTERVAL).contains(&minute_interval) {
        return Err(ConfigError::MinuteIntervalOutOfRange(minute_interval));
    }
    let tiles_hour = MINUTES_PER_HOUR % minute_interval == 0;
    let tiles_day =
        minute_interval % MINUTES_PER_HOUR == 0 && MINUTES_PER_DAY % minute_interval == 0;
    if tiles_hour || tiles_day {
        Ok(())
    } else {
        Err(ConfigError::MinuteIntervalNotAligned(minute_interval))
    }
}

fn check_hour(hour: u32) -> Result<(), ConfigError> {
    if hour > 23 {
        Err(ConfigError::HourOutOfRange(hour))
    } else {
        Ok(())
    }
}

fn check_hours(start_hour: Option<u32>, end_hour: Option<u32>) -> Result<(), ConfigError> {
    if let Some(start) = start_hour {
        check_hour(start)?;
    }
    if let Some(end) = end_hour {
        check_hour(end)?;
    }
    match (start_hour, end_hour) {
        (Some(start), Some(end)) if start >= end => {
            Err(ConfigError::HourWindowInverted { start, end })
        }
        _ => Ok(()),
    }
}

fn check_order(min: Option<EpochMillis>, max: Option<EpochMillis>) -> Result<(), ConfigError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ConfigError::MinAfterMax { min, max }),
        _ => Ok(()),
    }
}
