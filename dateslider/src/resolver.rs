//! Slot resolution: which labeled range contains an instant, and which range
//! lies `n` units away.
//!
//! A [`Labeler`] pairs a [`Granularity`] with a label format. It is a pure
//! function of `(instant, boundaries)`; scrollers call it to fill cells and to
//! step from one cell to its neighbour.

pub(crate) mod calendar;
mod oob;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike};
use chrono::format::{Item, StrftimeItems};
use chrono_tz::Tz;

use crate::{EpochMillis, boundaries::TimeBoundaries, error::ConfigError, slot::TimeSlot};

/// Calendar unit represented by one cell of a scroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Granularity {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Every granularity, finest first.
    pub const ALL: [Granularity; 6] = [
        Granularity::Minute,
        Granularity::Hour,
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
    ];

    /// strftime pattern used when no explicit format is configured.
    pub fn default_format(self) -> &'static str {
        match self {
            Granularity::Minute => "%H:%M",
            Granularity::Hour => "%H:00",
            Granularity::Day => "%a %e",
            Granularity::Week => "week %U",
            Granularity::Month => "%B",
            Granularity::Year => "%Y",
        }
    }

    /// Whether slots of this granularity are bounded by the hour-of-day
    /// window.
    pub fn within_day(self) -> bool {
        matches!(self, Granularity::Minute | Granularity::Hour)
    }

    /// Returns `true` if one unit of `self` spans several units of `other`.
    pub fn is_coarser_than(self, other: Granularity) -> bool {
        self > other
    }
}

/// Builds [`TimeSlot`]s of one granularity with one label format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labeler {
    granularity: Granularity,
    format: String,
}

impl Labeler {
    /// Creates a labeler, rejecting formats chrono cannot render.
    pub fn new(granularity: Granularity, format: impl Into<String>) -> Result<Self, ConfigError> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::InvalidFormat(format));
        }
        Ok(Self {
            granularity,
            format,
        })
    }

    /// Labeler using [`Granularity::default_format`].
    pub fn with_default_format(granularity: Granularity) -> Self {
        Self {
            granularity,
            format: granularity.default_format().to_owned(),
        }
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// The slot containing `instant`.
    ///
    /// Minute and hour slots are first pulled into the hour-of-day window, so
    /// their display instant always lies inside it.
    pub fn slot_for(&self, instant: EpochMillis, bounds: &TimeBoundaries) -> TimeSlot {
        let dt = calendar::from_millis(bounds.timezone(), instant);
        let dt = if self.granularity.within_day() {
            calendar::max_end_time(bounds, calendar::min_start_time(bounds, dt))
        } else {
            dt
        };
        let aligned = calendar::align_minute_interval(bounds, dt);
        let half = bounds.half_interval_millis();

        let (display, start, end) = match self.granularity {
            Granularity::Minute => {
                let shifted = calendar::shift_millis(aligned, -half);
                let length = i64::from(bounds.minute_interval()) * 60_000;
                (
                    aligned,
                    calendar::min_start_time(bounds, shifted),
                    calendar::max_end_time(bounds, calendar::shift_millis(shifted, length - 1)),
                )
            }
            Granularity::Hour => {
                // Shift instead of rebuilding the wall time, so the second
                // pass through a repeated hour keeps its own offset.
                let into_hour = i64::from(aligned.minute() * 60 + aligned.second());
                let display = calendar::shift_seconds(aligned, -into_hour);
                let shifted = calendar::shift_millis(display, -half);
                let length = Duration::hours(1).num_milliseconds();
                (
                    display,
                    calendar::min_start_time(bounds, shifted),
                    calendar::max_end_time(bounds, calendar::shift_millis(shifted, length - 1)),
                )
            }
            Granularity::Day => {
                let display = calendar::start_of_day(aligned);
                let next = calendar::add_days(display, 1);
                let (start, end) = day_span(bounds, display, display.date_naive(), next);
                (display, start, end)
            }
            Granularity::Week => {
                let back = i64::from(aligned.weekday().num_days_from_sunday());
                let display = calendar::start_of_day(calendar::add_days(aligned, -back));
                let next = calendar::add_days(display, 7);
                let last_day = calendar::add_days(display, 6).date_naive();
                let (start, end) = day_span(bounds, display, last_day, next);
                (display, start, end)
            }
            Granularity::Month => {
                let display = calendar::start_of_day(calendar::with_day(aligned, 1));
                let next = calendar::add_months(display, 1);
                let first = display.date_naive();
                let last_day = first
                    .with_day(calendar::last_day_of_month(first))
                    .unwrap_or(first);
                let (start, end) = day_span(bounds, display, last_day, next);
                (display, start, end)
            }
            Granularity::Year => {
                let first = NaiveDate::from_ymd_opt(aligned.year(), 1, 1);
                let display = match first {
                    Some(first) => calendar::start_of_day(calendar::with_date(aligned, first)),
                    None => calendar::start_of_day(aligned),
                };
                let next = calendar::add_months(display, 12);
                let last_day = NaiveDate::from_ymd_opt(aligned.year(), 12, 31)
                    .unwrap_or_else(|| display.date_naive());
                let (start, end) = day_span(bounds, display, last_day, next);
                (display, start, end)
            }
        };

        let oob = oob::classify(bounds, start, end, self.granularity.within_day());
        TimeSlot::new(
            display.format(&self.format).to_string(),
            start.timestamp_millis(),
            end.timestamp_millis(),
            display.timestamp_millis(),
            oob,
        )
    }

    /// The slot `delta` units away from the one containing `instant`.
    ///
    /// Month steps from the second half of a month land in the second half
    /// of the target month, so stepping from a month end stays on month ends.
    /// Minute and hour steps skip the hours outside the day window; an hour
    /// step never covers less than one minute interval.
    pub fn step(&self, instant: EpochMillis, delta: i32, bounds: &TimeBoundaries) -> TimeSlot {
        if delta == 0 {
            return self.slot_for(instant, bounds);
        }
        let dt = calendar::from_millis(bounds.timezone(), instant);
        let interval_seconds = i64::from(bounds.minute_interval()) * 60;
        let moved = match self.granularity {
            Granularity::Year => calendar::add_months(dt, delta.saturating_mul(12)),
            Granularity::Month => add_months_keeping_month_end(dt, delta),
            Granularity::Week => calendar::add_days(dt, i64::from(delta) * 7),
            Granularity::Day => calendar::add_days(dt, i64::from(delta)),
            Granularity::Hour => {
                let seconds = interval_seconds.max(calendar::SECONDS_PER_HOUR);
                step_within_window(bounds, dt, delta, seconds)
            }
            Granularity::Minute => step_within_window(bounds, dt, delta, interval_seconds),
        };
        self.slot_for(moved.timestamp_millis(), bounds)
    }
}

/// Start and end of a slot made of whole days from `display` to `last_day`.
fn day_span(
    bounds: &TimeBoundaries,
    display: DateTime<Tz>,
    last_day: NaiveDate,
    next: DateTime<Tz>,
) -> (DateTime<Tz>, DateTime<Tz>) {
    let half = bounds.half_interval_millis();
    let start = match bounds.start_hour() {
        Some(hour) => calendar::with_wall_time(display, hour, 0, 0, 0),
        None => calendar::shift_millis(display, -half),
    };
    let end = match calendar::end_reference(bounds, calendar::with_date(display, last_day)) {
        Some(reference) => reference,
        None => calendar::shift_millis(next, -half - 1),
    };
    (calendar::min_start_time(bounds, start), end)
}

pub(crate) fn add_months_keeping_month_end(dt: DateTime<Tz>, months: i32) -> DateTime<Tz> {
    let late_in_month = dt.day() > 15;
    let moved = calendar::add_months(dt, months);
    if late_in_month {
        calendar::with_day(moved, calendar::last_day_of_month(moved.date_naive()))
    } else {
        moved
    }
}

fn step_within_window(
    bounds: &TimeBoundaries,
    dt: DateTime<Tz>,
    delta: i32,
    unit_seconds: i64,
) -> DateTime<Tz> {
    let direction = i64::from(delta.signum());
    let mut current = dt;
    for _ in 0..delta.unsigned_abs() {
        current = calendar::shift_seconds(current, direction * unit_seconds);
        let before_start = bounds.start_hour().filter(|start| current.hour() < *start);
        if before_start.is_some() {
            let last_hour = bounds.end_hour().unwrap_or(23);
            current = with_hour(current, last_hour);
            let interval = i64::from(bounds.minute_interval());
            if interval > 60 {
                current = calendar::shift_seconds(
                    current,
                    (1 - interval / 60) * calendar::SECONDS_PER_HOUR,
                );
            }
            current = calendar::add_days(current, -1);
        } else if bounds.end_hour().is_some_and(|end| current.hour() >= end) {
            let past_end = calendar::end_reference(bounds, current)
                .is_some_and(|reference| current > reference);
            if past_end {
                current = with_hour(current, bounds.start_hour().unwrap_or(0));
                current = calendar::add_days(current, 1);
            }
        }
    }
    current
}

fn with_hour(dt: DateTime<Tz>, hour: u32) -> DateTime<Tz> {
    let millis = dt.timestamp_subsec_millis().min(999);
    calendar::with_wall_time(dt, hour, dt.minute(), dt.second(), millis)
}
