//! Wall-clock helpers shared by the slot resolvers.
//!
//! All field arithmetic runs on the local wall clock of the boundaries'
//! timezone and is then resolved back to an instant. Local times that fall
//! into a DST gap take the offset in force before the transition; ambiguous
//! local times take the earlier instant. Nothing in here panics on overflow:
//! out-of-range results saturate or leave the input unchanged.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, Offset,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

use crate::{EpochMillis, boundaries::TimeBoundaries};

pub(crate) const SECONDS_PER_HOUR: i64 = 3_600;

const GAP_PROBE_HOURS: i64 = 24;

/// Instant in `tz`, saturating outside chrono's representable range.
pub(crate) fn from_millis(tz: Tz, millis: EpochMillis) -> DateTime<Tz> {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(if millis < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    });
    utc.with_timezone(&tz)
}

/// Resolves a wall-clock time to an instant.
pub(crate) fn resolve_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let probe = naive
                .checked_sub_signed(Duration::hours(GAP_PROBE_HOURS))
                .unwrap_or(naive);
            let offset = tz.offset_from_utc_datetime(&probe).fix();
            let utc = naive
                .checked_sub_signed(Duration::seconds(i64::from(offset.local_minus_utc())))
                .unwrap_or(naive);
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Moves `dt` by an absolute amount of milliseconds.
pub(crate) fn shift_millis(dt: DateTime<Tz>, millis: i64) -> DateTime<Tz> {
    Duration::try_milliseconds(millis)
        .and_then(|delta| dt.checked_add_signed(delta))
        .unwrap_or(dt)
}

pub(crate) fn shift_seconds(dt: DateTime<Tz>, seconds: i64) -> DateTime<Tz> {
    shift_millis(dt, seconds.saturating_mul(1_000))
}

/// Same day, new wall-clock time.
pub(crate) fn with_wall_time(
    dt: DateTime<Tz>,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
) -> DateTime<Tz> {
    match dt.date_naive().and_hms_milli_opt(hour, minute, second, milli) {
        Some(naive) => resolve_local(dt.timezone(), naive),
        None => dt,
    }
}

/// Same wall-clock time on another day.
pub(crate) fn with_date(dt: DateTime<Tz>, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(dt.timezone(), date.and_time(dt.time()))
}

pub(crate) fn start_of_day(dt: DateTime<Tz>) -> DateTime<Tz> {
    with_wall_time(dt, 0, 0, 0, 0)
}

/// Adds calendar days, keeping the wall-clock time.
pub(crate) fn add_days(dt: DateTime<Tz>, days: i64) -> DateTime<Tz> {
    match dt.date_naive().checked_add_signed(Duration::days(days)) {
        Some(date) => with_date(dt, date),
        None => dt,
    }
}

/// Adds calendar months, clamping the day to the target month's length.
pub(crate) fn add_months(dt: DateTime<Tz>, months: i32) -> DateTime<Tz> {
    let date = dt.date_naive();
    let moved = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    match moved {
        Some(date) => with_date(dt, date),
        None => dt,
    }
}

pub(crate) fn last_day_of_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Same month, new day of month.
pub(crate) fn with_day(dt: DateTime<Tz>, day: u32) -> DateTime<Tz> {
    match dt.date_naive().with_day(day) {
        Some(date) => with_date(dt, date),
        None => dt,
    }
}

/// Rounds seconds-of-day to the nearest multiple of the minute interval,
/// halves rounding up.
pub(crate) fn align_seconds_of_day(seconds: i64, minute_interval: u32) -> i64 {
    let interval = i64::from(minute_interval.max(1)) * 60;
    let mut boundary = seconds.div_euclid(interval) * interval;
    if seconds - boundary >= interval / 2 {
        boundary += interval;
    }
    boundary
}

/// Rounds `dt` to the nearest minute-interval boundary and drops the
/// sub-second part.
pub(crate) fn align_minute_interval(bounds: &TimeBoundaries, dt: DateTime<Tz>) -> DateTime<Tz> {
    let seconds = i64::from(dt.num_seconds_from_midnight());
    let boundary = align_seconds_of_day(seconds, bounds.minute_interval());
    let aligned = shift_seconds(dt, boundary - seconds);
    aligned.with_nanosecond(0).unwrap_or(aligned)
}

/// Pulls `dt` forward to the start hour when it lies before it on its day.
pub(crate) fn min_start_time(bounds: &TimeBoundaries, dt: DateTime<Tz>) -> DateTime<Tz> {
    match bounds.start_hour() {
        Some(start) if dt.hour() < start => with_wall_time(dt, start, 0, 0, 0),
        _ => dt,
    }
}

/// Latest valid instant of `dt`'s day under the end hour: `end:59:59.999`
/// minus half a minute interval.
pub(crate) fn end_reference(bounds: &TimeBoundaries, dt: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let end = bounds.end_hour()?;
    let close = with_wall_time(dt, end, 59, 59, 999);
    Some(shift_millis(close, -bounds.half_interval_millis()))
}

/// Pulls `dt` back to the end reference when it lies after it on its day.
pub(crate) fn max_end_time(bounds: &TimeBoundaries, dt: DateTime<Tz>) -> DateTime<Tz> {
    match end_reference(bounds, dt) {
        Some(reference) if dt > reference => reference,
        _ => dt,
    }
}

/// Clamps an instant into the hour-of-day window of its own day.
pub(crate) fn clamp_to_hour_window(bounds: &TimeBoundaries, instant: EpochMillis) -> EpochMillis {
    let dt = from_millis(bounds.timezone(), instant);
    max_end_time(bounds, min_start_time(bounds, dt)).timestamp_millis()
}
