use chrono::DateTime;
use chrono_tz::Tz;

use crate::{EpochMillis, boundaries::TimeBoundaries, resolver::calendar};

/// Everything a host needs to rebuild a chain after a restart.
///
/// Slots and scroll positions are derived state and are recomputed on
/// [`PickerChain::restore`](crate::PickerChain::restore).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChainState {
    /// Current instant in epoch milliseconds.
    pub time_millis: EpochMillis,
    /// Zone the instant is shown in. Takes precedence over the zone stored
    /// in `boundaries`.
    pub timezone: Tz,
    /// Bounds, interval and hour window.
    pub boundaries: TimeBoundaries,
}

impl ChainState {
    /// The stored instant in its timezone.
    pub fn datetime(&self) -> DateTime<Tz> {
        calendar::from_millis(self.timezone, self.time_millis)
    }
}
