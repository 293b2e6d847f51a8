//! Configuration errors surfaced by the picker setters.
//!
//! Runtime operations (scrolling, fling ticks, programmatic time changes)
//! never fail. Only the calls that change boundaries, formats or geometry can
//! reject their input, and they do so before any state is touched.

use thiserror::Error;

use crate::{EpochMillis, resolver::Granularity};

/// Rejected configuration passed to a boundary, format or layout setter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The minute interval lies outside `1..=120`.
    #[error("minute interval {0} is outside the accepted range 1..=120")]
    MinuteIntervalOutOfRange(u32),
    /// The minute interval neither divides an hour nor tiles a day in whole hours.
    #[error("minute interval {0} must divide 60, or be a multiple of 60 that divides 1440")]
    MinuteIntervalNotAligned(u32),
    /// An hour of day lies outside `0..=23`.
    #[error("hour {0} is outside the accepted range 0..=23")]
    HourOutOfRange(u32),
    /// The start hour is not strictly before the end hour.
    #[error("start hour {start} must be before end hour {end}")]
    HourWindowInverted {
        /// Requested first hour of the day.
        start: u32,
        /// Requested last hour of the day.
        end: u32,
    },
    /// The minimum instant lies after the maximum instant.
    #[error("minimum instant {min} lies after maximum instant {max}")]
    MinAfterMax {
        /// Requested lower bound in epoch milliseconds.
        min: EpochMillis,
        /// Requested upper bound in epoch milliseconds.
        max: EpochMillis,
    },
    /// A label format string contains an unknown specifier.
    #[error("invalid label format {0:?}")]
    InvalidFormat(String),
    /// The timezone id is not part of the IANA database.
    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),
    /// A chain was built without any scroller.
    #[error("a picker chain needs at least one scroller")]
    EmptyChain,
    /// Scrollers are not ordered strictly from coarse to fine.
    #[error("{finer:?} scroller cannot precede {coarser:?} scroller")]
    ChainOrder {
        /// Granularity found earlier in the chain.
        finer: Granularity,
        /// Granularity found after it.
        coarser: Granularity,
    },
    /// Cell or viewport width is not positive.
    #[error("cell width {cell} and viewport width {viewport} must both be positive")]
    InvalidGeometry {
        /// Requested cell width in pixels.
        cell: i32,
        /// Requested viewport width in pixels.
        viewport: i32,
    },
    /// A scroller index does not exist in the chain.
    #[error("no scroller at index {index} (chain has {len})")]
    NoSuchScroller {
        /// Requested index.
        index: usize,
        /// Number of scrollers in the chain.
        len: usize,
    },
}
