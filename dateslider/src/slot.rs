//! Labeled time ranges bound to scroller cells.

use crate::EpochMillis;

/// Out-of-bounds classification of a slot against the global min/max.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OobFlags {
    /// The slot lies entirely before the minimum or entirely after the maximum.
    pub out_of_bounds: bool,
    /// The minimum (or the start of the day window) falls inside the slot.
    pub left: bool,
    /// The maximum (or the end of the day window) falls inside the slot.
    pub right: bool,
}

/// One labeled, contiguous range of time occupying a cell.
///
/// A slot is built once by a [`Labeler`](crate::Labeler) and never changes
/// afterwards; scrollers copy slots between cells instead of editing them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSlot {
    label: String,
    start: EpochMillis,
    end: EpochMillis,
    display: EpochMillis,
    oob: OobFlags,
}

impl TimeSlot {
    pub(crate) fn new(
        label: String,
        start: EpochMillis,
        end: EpochMillis,
        display: EpochMillis,
        oob: OobFlags,
    ) -> Self {
        Self {
            label,
            start,
            end,
            display,
            oob,
        }
    }

    /// Formatted text for the cell.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// First instant covered by the slot.
    pub fn start(&self) -> EpochMillis {
        self.start
    }

    /// Last instant covered by the slot (inclusive).
    pub fn end(&self) -> EpochMillis {
        self.end
    }

    /// Canonical instant represented by the slot, e.g. midnight for a day.
    pub fn display(&self) -> EpochMillis {
        self.display
    }

    pub fn oob(&self) -> OobFlags {
        self.oob
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.oob.out_of_bounds
    }

    /// Returns `true` if `instant` lies in `[start, end]`.
    pub fn contains(&self, instant: EpochMillis) -> bool {
        (self.start..=self.end).contains(&instant)
    }

    /// Length of the covered range in milliseconds.
    pub fn span(&self) -> i64 {
        self.end - self.start
    }

    /// Position of `instant` inside the slot, `0.0` at `start` and `1.0` at
    /// `end`. Degenerate slots report the midpoint.
    pub fn fraction_of(&self, instant: EpochMillis) -> f64 {
        let span = self.span();
        if span <= 0 {
            return 0.5;
        }
        (instant - self.start) as f64 / span as f64
    }

    /// Instant at `fraction` of the way through the slot, clamped into it.
    pub fn instant_at(&self, fraction: f64) -> EpochMillis {
        let offset = (self.span() as f64 * fraction) as i64;
        self.start.saturating_add(offset).clamp(self.start, self.end)
    }
}
