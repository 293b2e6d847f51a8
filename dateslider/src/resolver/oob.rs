//! Out-of-bounds classification of freshly built slots.

use std::ops::RangeInclusive;

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

use super::calendar;
use crate::{EpochMillis, boundaries::TimeBoundaries, slot::OobFlags};

/// Classifies `[start, end]` against the global bounds.
///
/// Edge flags win over `out_of_bounds`: a slot with the minimum strictly
/// inside it is partially valid, never fully out. A bound sitting exactly on
/// the slot's start or end is not an edge. With `check_hours`, slots that touch the
/// day window (start exactly on the start hour, or end at or past the end
/// reference) are flagged as edges too.
pub(crate) fn classify(
    bounds: &TimeBoundaries,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    check_hours: bool,
) -> OobFlags {
    let range = start.timestamp_millis()..=end.timestamp_millis();
    let mut flags = OobFlags::default();

    if bounds.min_time().is_some_and(|min| min > *range.start()) {
        flags.out_of_bounds = true;
    }
    if bounds.max_time().is_some_and(|max| max < *range.end()) {
        flags.out_of_bounds = true;
    }
    if bounds.min_time().is_some_and(|min| strictly_inside(&range, min)) {
        flags.left = true;
        flags.out_of_bounds = false;
    }
    if bounds.max_time().is_some_and(|max| strictly_inside(&range, max)) {
        flags.right = true;
        flags.out_of_bounds = false;
    }

    if check_hours {
        if starts_day_window(bounds, start) {
            flags.left = true;
        } else if calendar::end_reference(bounds, end).is_some_and(|reference| end >= reference) {
            flags.right = true;
        }
    }
    flags
}

fn strictly_inside(range: &RangeInclusive<EpochMillis>, bound: EpochMillis) -> bool {
    *range.start() < bound && bound < *range.end()
}

fn starts_day_window(bounds: &TimeBoundaries, start: DateTime<Tz>) -> bool {
    bounds.start_hour().is_some_and(|hour| {
        start.hour() == hour && start.minute() == 0 && start.second() == 0 && start.nanosecond() == 0
    })
}
