//! Picker chain: several scrollers kept on one coherent instant.
//!
//! ## Usage
//!
//! Order scrollers from the coarsest to the finest granularity, e.g. day,
//! hour, minute. Route every gesture through the chain by scroller index; it
//! forwards the refined instant to the other scrollers and calls the
//! time-change listener when the finest scroller settles on a new unit.
//!
//! ```
//! use chrono::TimeZone;
//! use chrono_tz::Tz;
//! use dateslider::{Granularity, PickerChain, Px, ScrollerArgs, TimeBoundaries};
//!
//! let bounds = TimeBoundaries::default().with_minute_interval(15).unwrap();
//! let start = Tz::UTC.with_ymd_and_hms(2023, 6, 15, 10, 7, 0).unwrap();
//! let mut chain = PickerChain::new(
//!     bounds,
//!     [Granularity::Day, Granularity::Hour, Granularity::Minute]
//!         .map(|granularity| ScrollerArgs::default().granularity(granularity)),
//!     start.timestamp_millis(),
//! )
//! .unwrap();
//!
//! assert_eq!(chain.current_datetime().format("%H:%M").to_string(), "10:00");
//! chain.scroll_by(2, Px::new(80)).unwrap();
//! assert_eq!(chain.current_datetime().format("%H:%M").to_string(), "10:15");
//! ```

mod state;

use std::{sync::Arc, time::Duration};

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

pub use state::ChainState;

use crate::{
    EpochMillis, Px,
    boundaries::{BoundaryOverrides, TimeBoundaries},
    error::ConfigError,
    prop::{CallbackWith, RenderSlotWith},
    resolver::calendar,
    scroller::{CellUpdate, Received, ScrollerArgs, WindowedScroller},
};

/// Coordinator owning an ordered set of [`WindowedScroller`]s.
#[derive(Debug)]
pub struct PickerChain {
    scrollers: Vec<WindowedScroller>,
    bounds: Arc<TimeBoundaries>,
    current_time: EpochMillis,
    on_time_changed: Option<CallbackWith<EpochMillis>>,
}

impl PickerChain {
    /// Builds a chain centred on `instant`.
    ///
    /// `scrollers` must be non-empty and strictly ordered from coarse to
    /// fine.
    pub fn new(
        bounds: TimeBoundaries,
        scrollers: impl IntoIterator<Item = ScrollerArgs>,
        instant: EpochMillis,
    ) -> Result<Self, ConfigError> {
        bounds.validate()?;
        let args: Vec<ScrollerArgs> = scrollers.into_iter().collect();
        if args.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        for pair in args.windows(2) {
            if !pair[0].granularity.is_coarser_than(pair[1].granularity) {
                return Err(ConfigError::ChainOrder {
                    finer: pair[0].granularity,
                    coarser: pair[1].granularity,
                });
            }
        }

        let bounds = Arc::new(bounds);
        let current_time = normalize(&bounds, instant);
        let scrollers = args
            .into_iter()
            .enumerate()
            .map(|(index, args)| {
                let mut scroller =
                    WindowedScroller::new(args, Arc::clone(&bounds), current_time)?;
                scroller.set_index(index);
                Ok(scroller)
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            scrollers,
            bounds,
            current_time,
            on_time_changed: None,
        })
    }

    /// Resolved current instant.
    pub fn current_time(&self) -> EpochMillis {
        self.current_time
    }

    /// Resolved current instant in the chain's timezone.
    pub fn current_datetime(&self) -> DateTime<Tz> {
        calendar::from_millis(self.bounds.timezone(), self.current_time)
    }

    pub fn boundaries(&self) -> &TimeBoundaries {
        &self.bounds
    }

    /// Scrollers, coarsest first.
    pub fn scrollers(&self) -> &[WindowedScroller] {
        &self.scrollers
    }

    pub fn scroller(&self, index: usize) -> Option<&WindowedScroller> {
        self.scrollers.get(index)
    }

    /// Replaces the time-change listener.
    pub fn set_on_time_changed(&mut self, listener: Option<CallbackWith<EpochMillis>>) {
        self.on_time_changed = listener;
    }

    /// Installs the per-cell render hook on every scroller and paints all
    /// cells once.
    pub fn set_render_slot(&mut self, render: Option<RenderSlotWith<CellUpdate>>) {
        for scroller in &mut self.scrollers {
            scroller.set_render_slot(render.clone());
        }
    }

    /// Moves every scroller to `instant` after binding it to the bounds,
    /// the hour window and the minute interval.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_time(&mut self, instant: EpochMillis) {
        self.arrange(instant, None);
    }

    /// Like [`set_time`](Self::set_time), but leaves scroller `source`
    /// alone because it already shows the change.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_time_except(
        &mut self,
        instant: EpochMillis,
        source: usize,
    ) -> Result<(), ConfigError> {
        self.check_index(source)?;
        self.arrange(instant, Some(source));
        Ok(())
    }

    /// Merges `overrides` into the boundaries, then sets the time.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn set_time_with(
        &mut self,
        instant: EpochMillis,
        overrides: &BoundaryOverrides,
    ) -> Result<(), ConfigError> {
        let merged = self.bounds.merge(overrides)?;
        self.install(merged);
        self.arrange(instant, None);
        Ok(())
    }

    pub fn set_min_time(&mut self, min_time: Option<EpochMillis>) -> Result<(), ConfigError> {
        let next = self.bounds.with_min_time(min_time)?;
        self.reconfigure(next);
        Ok(())
    }

    pub fn set_max_time(&mut self, max_time: Option<EpochMillis>) -> Result<(), ConfigError> {
        let next = self.bounds.with_max_time(max_time)?;
        self.reconfigure(next);
        Ok(())
    }

    pub fn set_minute_interval(&mut self, minute_interval: u32) -> Result<(), ConfigError> {
        let next = self.bounds.with_minute_interval(minute_interval)?;
        self.reconfigure(next);
        Ok(())
    }

    pub fn set_hours(
        &mut self,
        start_hour: Option<u32>,
        end_hour: Option<u32>,
    ) -> Result<(), ConfigError> {
        let next = self.bounds.with_hours(start_hour, end_hour)?;
        self.reconfigure(next);
        Ok(())
    }

    /// Recomputes every slot in `timezone`, keeping the current instant.
    pub fn set_timezone(&mut self, timezone: Tz) {
        let next = self.bounds.with_timezone(timezone);
        self.reconfigure(next);
    }

    /// [`set_timezone`](Self::set_timezone) from an IANA id such as
    /// `"Europe/Berlin"`.
    pub fn set_timezone_id(&mut self, id: &str) -> Result<(), ConfigError> {
        let timezone = id
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(id.to_owned()))?;
        self.set_timezone(timezone);
        Ok(())
    }

    /// Marks the start of a drag on scroller `index`.
    pub fn begin_drag(&mut self, index: usize) -> Result<(), ConfigError> {
        self.scroller_mut(index)?.begin_drag();
        Ok(())
    }

    /// Scrolls scroller `index` and propagates the result.
    ///
    /// Returns the chain's current time, which is the leaf scroller's display
    /// instant. It differs from the refined instant of a coarser source
    /// scroller whenever the leaf absorbs the move.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn scroll_by(&mut self, index: usize, delta: Px) -> Result<EpochMillis, ConfigError> {
        let instant = self.scroller_mut(index)?.scroll_by(delta);
        self.propagate(index, instant);
        Ok(self.current_time)
    }

    /// Centres the cell under viewport position `x` of scroller `index`.
    /// Returns the leaf's display instant, like [`scroll_by`](Self::scroll_by).
    pub fn tap(&mut self, index: usize, x: Px) -> Result<EpochMillis, ConfigError> {
        let instant = self.scroller_mut(index)?.tap(x);
        self.propagate(index, instant);
        Ok(self.current_time)
    }

    /// Releases scroller `index` with `velocity` px/s. Returns whether it
    /// keeps coasting.
    pub fn fling(&mut self, index: usize, velocity: f32) -> Result<bool, ConfigError> {
        Ok(self.scroller_mut(index)?.fling(velocity))
    }

    /// Advances every active fling by `elapsed`. Returns `true` while any
    /// scroller is still coasting.
    pub fn fling_tick(&mut self, elapsed: Duration) -> bool {
        for index in 0..self.scrollers.len() {
            if let Some(instant) = self.scrollers[index].fling_tick(elapsed) {
                self.propagate(index, instant);
            }
        }
        self.is_flinging()
    }

    pub fn is_flinging(&self) -> bool {
        self.scrollers.iter().any(WindowedScroller::is_flinging)
    }

    /// Gives scroller `index` a new viewport width.
    pub fn resize(&mut self, index: usize, viewport_width: Px) -> Result<(), ConfigError> {
        self.scroller_mut(index)?.resize(viewport_width)
    }

    /// Snapshot for persistence.
    pub fn state(&self) -> ChainState {
        ChainState {
            time_millis: self.current_time,
            timezone: self.bounds.timezone(),
            boundaries: (*self.bounds).clone(),
        }
    }

    /// Re-applies a snapshot taken by [`state`](Self::state).
    #[tracing::instrument(level = "debug", skip(self, state))]
    pub fn restore(&mut self, state: &ChainState) -> Result<(), ConfigError> {
        state.boundaries.validate()?;
        self.install(state.boundaries.with_timezone(state.timezone));
        self.arrange(state.time_millis, None);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), ConfigError> {
        if index < self.scrollers.len() {
            Ok(())
        } else {
            Err(ConfigError::NoSuchScroller {
                index,
                len: self.scrollers.len(),
            })
        }
    }

    fn scroller_mut(&mut self, index: usize) -> Result<&mut WindowedScroller, ConfigError> {
        self.check_index(index)?;
        Ok(&mut self.scrollers[index])
    }

    /// Hands a new snapshot to every scroller without relabeling.
    fn install(&mut self, bounds: TimeBoundaries) {
        let bounds = Arc::new(bounds);
        for scroller in &mut self.scrollers {
            scroller.swap_boundaries(Arc::clone(&bounds));
        }
        self.bounds = bounds;
    }

    fn reconfigure(&mut self, bounds: TimeBoundaries) {
        self.install(bounds);
        self.arrange(self.current_time, None);
    }

    fn arrange(&mut self, instant: EpochMillis, source: Option<usize>) {
        let normalized = normalize(&self.bounds, instant);
        for (index, scroller) in self.scrollers.iter_mut().enumerate() {
            if Some(index) != source {
                scroller.set_time(normalized);
            }
        }
        debug!(instant, normalized, "chain arranged");
        self.current_time = normalized;
        self.emit();
    }

    /// Routes an instant reported by scroller `source` up to its coarser
    /// neighbours, stopping at the first one that absorbs it, and down
    /// through every finer one.
    fn propagate(&mut self, source: usize, instant: EpochMillis) {
        for parent in (0..source).rev() {
            if self.scrollers[parent].receive_from_child(instant) == Received::Absorbed {
                break;
            }
        }

        let leaf = self.scrollers.len() - 1;
        let mut leaf_moved = source == leaf;
        for child in source + 1..=leaf {
            let received = self.scrollers[child].receive_from_parent(instant);
            if child == leaf {
                leaf_moved = received == Received::Relabeled;
            }
        }

        if leaf_moved {
            let display = self.scrollers[leaf].display_time();
            if display != self.current_time {
                self.current_time = display;
                self.emit();
            }
        }
    }

    fn emit(&self) {
        if let Some(listener) = &self.on_time_changed {
            listener.call(self.current_time);
        }
    }
}

/// Binds `instant` to the bounds and the hour window, then aligns it to the
/// minute interval.
fn normalize(bounds: &TimeBoundaries, instant: EpochMillis) -> EpochMillis {
    let bound = bounds.bind_to_min_max(instant);
    let dt = calendar::from_millis(bounds.timezone(), bound);
    let dt = calendar::max_end_time(bounds, calendar::min_start_time(bounds, dt));
    calendar::align_minute_interval(bounds, dt).timestamp_millis()
}
