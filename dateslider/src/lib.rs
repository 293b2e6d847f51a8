//! # dateslider
//!
//! Engine behind horizontally scrolling date and time pickers.
//!
//! A picker shows an endless strip of calendar units (minutes, hours, days,
//! weeks, months or years). Only a handful of cells exist at any time: as the
//! strip scrolls, cells leaving one side are recycled on the other and
//! relabeled. Several strips of different granularity can be chained so that
//! they always agree on one instant, within optional bounds, an hour-of-day
//! window and a minute interval.
//!
//! The crate is headless. Hosts feed it pixel deltas, taps and fling ticks,
//! and receive labels plus a time-change notification to paint and act on.
//!
//! ## Building blocks
//!
//! - [`TimeBoundaries`]: validated, immutable constraints shared by a chain.
//! - [`Labeler`]: resolves an instant to a [`TimeSlot`] of one
//!   [`Granularity`] and steps between slots.
//! - [`WindowedScroller`]: the recycled ring of cells for one granularity.
//! - [`PickerChain`]: keeps a coarse-to-fine list of scrollers in sync.
//!
//! ## Features
//!
//! - `serde` (default): `Serialize`/`Deserialize` for [`TimeBoundaries`],
//!   [`TimeSlot`] and [`ChainState`].

pub mod boundaries;
pub mod chain;
pub mod error;
pub mod prop;
pub mod px;
pub mod resolver;
pub mod scroller;
pub mod slot;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;

pub use crate::{
    boundaries::{BoundaryOverrides, MAX_MINUTE_INTERVAL, TimeBoundaries},
    chain::{ChainState, PickerChain},
    error::ConfigError,
    prop::{CallbackWith, RenderSlotWith},
    px::Px,
    resolver::{Granularity, Labeler},
    scroller::{CellUpdate, Received, ScrollerArgs, WindowedScroller},
    slot::{OobFlags, TimeSlot},
};
