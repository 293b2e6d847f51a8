//! Windowed scroller: a fixed, odd-sized ring of cells over an endless time
//! axis.
//!
//! ## Usage
//!
//! Build one scroller per granularity, feed it drag deltas, taps and fling
//! ticks, and read the refined instant it derives from its scroll position.
//! Scrollers never talk to each other directly; a
//! [`PickerChain`](crate::PickerChain) routes the instants they report.
//!
//! Positive deltas move toward later time. The centre cell's slot is the
//! scroller's current unit, and the fraction of the centre cell under the
//! middle of the viewport picks an instant inside that unit.

mod fling;

use std::{sync::Arc, time::Duration};

use derive_setters::Setters;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::{
    EpochMillis, Px,
    boundaries::TimeBoundaries,
    error::ConfigError,
    prop::RenderSlotWith,
    resolver::{Granularity, Labeler, calendar},
    slot::TimeSlot,
};
use fling::ActiveFling;

/// How many times a seek may shift the ring before giving up.
const MAX_SEEK_ATTEMPTS: usize = 3;

const DEFAULT_CELL_WIDTH: Px = Px::new(80);
const DEFAULT_VIEWPORT_WIDTH: Px = Px::new(400);

/// Configuration for one [`WindowedScroller`].
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
pub struct ScrollerArgs {
    /// Calendar unit shown by each cell.
    pub granularity: Granularity,
    /// strftime pattern for cell labels; the granularity's default when unset.
    #[setters(strip_option, into)]
    pub format: Option<String>,
    /// Width of one cell along the scroll axis.
    pub cell_width: Px,
    /// Width of the visible area along the scroll axis.
    pub viewport_width: Px,
    /// Explicit number of cells. Derived from the widths when unset; even
    /// counts are bumped to the next odd number.
    #[setters(strip_option)]
    pub cell_count: Option<usize>,
}

impl Default for ScrollerArgs {
    fn default() -> Self {
        Self {
            granularity: Granularity::Day,
            format: None,
            cell_width: DEFAULT_CELL_WIDTH,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            cell_count: None,
        }
    }
}

/// Payload of the per-cell render hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    /// Position of the scroller in its chain.
    pub scroller: usize,
    /// Cell index, `0` being the leftmost.
    pub cell: usize,
    /// Slot now bound to the cell.
    pub slot: TimeSlot,
}

/// Outcome of routing an instant from a neighbouring scroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// The instant fell inside the centre slot; only the fraction moved.
    Absorbed,
    /// The ring was relabeled around the instant.
    Relabeled,
}

/// Ring of [`TimeSlot`] cells centred on the current unit of one
/// granularity.
#[derive(Debug)]
pub struct WindowedScroller {
    index: usize,
    labeler: Labeler,
    bounds: Arc<TimeBoundaries>,
    cells: SmallVec<[TimeSlot; 7]>,
    cell_width: Px,
    viewport_width: Px,
    initial_offset: Px,
    /// Applied scroll position, folded back near `initial_offset`.
    scroll_x: Px,
    /// Accumulated, unfolded scroll target.
    target_x: Px,
    last_target: Px,
    current_time: EpochMillis,
    fling: Option<ActiveFling>,
    render: Option<RenderSlotWith<CellUpdate>>,
}

impl WindowedScroller {
    /// Creates a scroller centred on `instant`.
    pub fn new(
        args: ScrollerArgs,
        bounds: Arc<TimeBoundaries>,
        instant: EpochMillis,
    ) -> Result<Self, ConfigError> {
        check_geometry(args.cell_width, args.viewport_width)?;
        let labeler = match args.format {
            Some(format) => Labeler::new(args.granularity, format)?,
            None => Labeler::with_default_format(args.granularity),
        };
        let count = cell_count(args.cell_count, args.cell_width, args.viewport_width);
        let seed = labeler.slot_for(instant, &bounds);

        let mut scroller = Self {
            index: 0,
            labeler,
            bounds,
            cells: SmallVec::from_elem(seed, count),
            cell_width: args.cell_width,
            viewport_width: args.viewport_width,
            initial_offset: Px::ZERO,
            scroll_x: Px::ZERO,
            target_x: Px::ZERO,
            last_target: Px::ZERO,
            current_time: instant,
            fling: None,
            render: None,
        };
        scroller.reset_scroll();
        scroller.set_time(instant);
        Ok(scroller)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn granularity(&self) -> Granularity {
        self.labeler.granularity()
    }

    pub fn labeler(&self) -> &Labeler {
        &self.labeler
    }

    pub fn boundaries(&self) -> &TimeBoundaries {
        &self.bounds
    }

    /// All cells, left to right.
    pub fn cells(&self) -> &[TimeSlot] {
        &self.cells
    }

    pub fn center_index(&self) -> usize {
        self.cells.len() / 2
    }

    pub fn center_slot(&self) -> &TimeSlot {
        &self.cells[self.center_index()]
    }

    /// Instant last derived from the scroll position or received from a
    /// neighbour.
    pub fn current_time(&self) -> EpochMillis {
        self.current_time
    }

    /// Display instant of the centre slot.
    pub fn display_time(&self) -> EpochMillis {
        self.center_slot().display()
    }

    pub fn cell_width(&self) -> Px {
        self.cell_width
    }

    pub fn viewport_width(&self) -> Px {
        self.viewport_width
    }

    /// Distance of the applied scroll position from its resting offset.
    pub fn scroll_offset(&self) -> Px {
        self.scroll_x - self.initial_offset
    }

    /// Position of the viewport centre inside the centre cell, `0.5` at rest.
    pub fn center_fraction(&self) -> f64 {
        let center_left = self.cell_width * self.center_index() as i32 - self.scroll_x;
        (self.viewport_width.to_f64() / 2.0 - center_left.to_f64()) / self.cell_width.to_f64()
    }

    pub fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    /// Installs the per-cell render hook and paints every cell once.
    pub fn set_render_slot(&mut self, render: Option<RenderSlotWith<CellUpdate>>) {
        self.render = render;
        self.repaint();
    }

    /// Relabels every cell around `instant` and moves the scroll fraction
    /// onto it.
    pub fn set_time(&mut self, instant: EpochMillis) {
        let instant = self.clamp_into_window(instant);
        self.relabel(instant);
        self.current_time = instant;
        self.seek(instant);
    }

    /// Swaps the boundaries snapshot and resynchronises on the current time.
    pub fn set_boundaries(&mut self, bounds: Arc<TimeBoundaries>) {
        self.swap_boundaries(bounds);
        self.set_time(self.current_time);
    }

    /// Marks the start of a drag gesture, stopping any momentum.
    pub fn begin_drag(&mut self) {
        self.fling = None;
    }

    /// Scrolls by `delta` and returns the refined current instant.
    pub fn scroll_by(&mut self, delta: Px) -> EpochMillis {
        self.target_x = self.target_x.saturating_add(delta);
        self.re_scroll_to(self.target_x, true)
            .unwrap_or(self.current_time)
    }

    /// Brings the cell under viewport position `x` to the centre.
    pub fn tap(&mut self, x: Px) -> EpochMillis {
        self.fling = None;
        self.scroll_by(x - self.viewport_width / 2)
    }

    /// Starts momentum scrolling at `velocity` px/s. Returns `false` when the
    /// velocity is too low to coast.
    pub fn fling(&mut self, velocity: f32) -> bool {
        self.fling = ActiveFling::start(velocity);
        if let Some(fling) = &self.fling {
            trace!(scroller = self.index, velocity = fling.velocity(), "fling started");
        }
        self.fling.is_some()
    }

    /// Advances momentum by `elapsed` through the same path as a drag.
    ///
    /// Returns the refined instant if the scroll position moved.
    pub fn fling_tick(&mut self, elapsed: Duration) -> Option<EpochMillis> {
        let mut fling = self.fling.take()?;
        let (delta, running) = fling.advance(elapsed);
        if running {
            self.fling = Some(fling);
        }
        if delta == Px::ZERO {
            return None;
        }
        Some(self.scroll_by(delta))
    }

    /// Adapts to a new viewport width and re-centres on the current time.
    pub fn resize(&mut self, viewport_width: Px) -> Result<(), ConfigError> {
        check_geometry(self.cell_width, viewport_width)?;
        self.viewport_width = viewport_width;
        self.reset_scroll();
        self.set_time(self.current_time);
        Ok(())
    }

    /// A finer scroller reports `instant`.
    pub fn receive_from_child(&mut self, instant: EpochMillis) -> Received {
        self.follow(instant)
    }

    /// A coarser scroller reports `instant`.
    pub fn receive_from_parent(&mut self, instant: EpochMillis) -> Received {
        self.follow(instant)
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    /// Stores a new snapshot without relabeling; the caller resynchronises.
    pub(crate) fn swap_boundaries(&mut self, bounds: Arc<TimeBoundaries>) {
        self.bounds = bounds;
    }

    fn follow(&mut self, instant: EpochMillis) -> Received {
        let instant = self.clamp_into_window(instant);
        if self.center_slot().contains(instant) {
            self.current_time = instant;
            self.seek(instant);
            Received::Absorbed
        } else {
            self.set_time(instant);
            Received::Relabeled
        }
    }

    fn clamp_into_window(&self, instant: EpochMillis) -> EpochMillis {
        if self.granularity().within_day() {
            calendar::clamp_to_hour_window(&self.bounds, instant)
        } else {
            instant
        }
    }

    fn reset_scroll(&mut self) {
        let count = self.cells.len() as i32;
        self.initial_offset = (self.cell_width * count - self.viewport_width) / 2;
        self.scroll_x = self.initial_offset;
        self.target_x = self.initial_offset;
        self.last_target = self.initial_offset;
    }

    fn relabel(&mut self, instant: EpochMillis) {
        let center = self.center_index();
        let slot = self.labeler.slot_for(instant, &self.bounds);
        self.bind(center, slot);
        for cell in center + 1..self.cells.len() {
            let slot = self
                .labeler
                .step(self.cells[cell - 1].display(), 1, &self.bounds);
            self.bind(cell, slot);
        }
        for cell in (0..center).rev() {
            let slot = self
                .labeler
                .step(self.cells[cell + 1].display(), -1, &self.bounds);
            self.bind(cell, slot);
        }
    }

    /// Moves the ring so that the centre slot contains `instant`, then aligns
    /// the scroll fraction on it.
    fn seek(&mut self, instant: EpochMillis) -> bool {
        for _ in 0..=MAX_SEEK_ATTEMPTS {
            let center = self.center_slot().clone();
            if center.contains(instant) {
                let goal = center.fraction_of(instant);
                let shift = Px::saturating_from_f64(
                    (self.center_fraction() - goal) * self.cell_width.to_f64(),
                );
                if shift == Px::ZERO {
                    return true;
                }
                self.target_x -= shift;
                self.re_scroll_to(self.target_x, false);
                if self.center_slot().contains(instant) {
                    return true;
                }
                continue;
            }

            let span = center.span().max(1);
            let middle = center.start() + span / 2;
            let mut steps = ((instant - middle) as f64 / span as f64).round() as i32;
            if steps == 0 {
                steps = (instant - middle).signum() as i32;
            }
            trace!(scroller = self.index, steps, "seek shifts ring");
            self.move_elements(-steps);
        }

        let center = self.center_slot();
        warn!(
            scroller = self.index,
            instant,
            start = center.start(),
            end = center.end(),
            "seek did not converge, keeping current cells"
        );
        false
    }

    /// Applies the scroll target `x`. User-driven moves are clamped at the
    /// global bounds and report the refined instant.
    fn re_scroll_to(&mut self, x: Px, user_driven: bool) -> Option<EpochMillis> {
        let mut x = x;
        let mut diff = x - self.last_target;
        if user_driven && diff != Px::ZERO {
            if let Some(deviation) = self.bound_deviation(diff) {
                debug!(
                    scroller = self.index,
                    requested = diff.raw(),
                    absorbed = deviation.raw(),
                    "scroll clamped at bound"
                );
                x -= deviation;
                self.target_x -= deviation;
                diff -= deviation;
                self.fling = None;
            }
        }

        let width = self.cell_width;
        let half = width / 2;
        let offset = self.initial_offset;
        let mut scroll = self.scroll_x + diff;
        let relative = scroll - offset;
        if relative > half {
            let steps = (relative + half) / width;
            self.move_elements(-steps);
            scroll = (relative - half) % width + offset - half;
        } else if -relative > half {
            let steps = (-relative + half) / width;
            self.move_elements(steps);
            scroll = offset + half - (offset + half - scroll) % width;
        }
        self.scroll_x = scroll;
        self.last_target = x;

        user_driven.then(|| self.report_current())
    }

    /// Part of `diff` that would carry the centre past a global bound.
    fn bound_deviation(&self, diff: Px) -> Option<Px> {
        let center = self.center_slot();
        let span = center.span() as f64;
        let here = center.start() as f64 + self.center_fraction() * span;
        let estimate = here + diff.to_f64() / self.cell_width.to_f64() * span;
        let bound = if diff < Px::ZERO {
            self.bounds
                .min_time()
                .filter(|&min| estimate < min as f64)?
        } else {
            self.bounds
                .max_time()
                .filter(|&max| estimate > max as f64)?
        };

        let travel = here - estimate;
        let ratio = if travel.abs() < f64::EPSILON {
            0.0
        } else {
            ((here - bound as f64) / travel).clamp(0.0, 1.0)
        };
        let allowed = Px::saturating_from_f64(diff.to_f64() * ratio);
        Some(diff - allowed)
    }

    fn report_current(&mut self) -> EpochMillis {
        let center = self.center_slot();
        let instant = center.instant_at(self.center_fraction());
        let instant = calendar::clamp_to_hour_window(&self.bounds, instant);
        self.current_time = self.bounds.bind_to_min_max(instant);
        self.current_time
    }

    /// Shifts every cell by `shift` positions: cell `i` takes the slot of
    /// cell `i - shift`, and cells without such a source step from their own
    /// slot instead.
    fn move_elements(&mut self, shift: i32) {
        if shift == 0 {
            return;
        }
        let len = self.cells.len() as i64;
        let order: SmallVec<[usize; 16]> = if shift < 0 {
            (0..self.cells.len()).collect()
        } else {
            (0..self.cells.len()).rev().collect()
        };
        for cell in order {
            let source = cell as i64 - i64::from(shift);
            let slot = if (0..len).contains(&source) {
                self.cells[source as usize].clone()
            } else {
                self.labeler
                    .step(self.cells[cell].display(), -shift, &self.bounds)
            };
            self.bind(cell, slot);
        }
    }

    fn bind(&mut self, cell: usize, slot: TimeSlot) {
        if self.cells[cell] == slot {
            return;
        }
        self.cells[cell] = slot;
        if let Some(render) = &self.render {
            render.render(CellUpdate {
                scroller: self.index,
                cell,
                slot: self.cells[cell].clone(),
            });
        }
    }

    fn repaint(&self) {
        let Some(render) = &self.render else {
            return;
        };
        for (cell, slot) in self.cells.iter().enumerate() {
            render.render(CellUpdate {
                scroller: self.index,
                cell,
                slot: slot.clone(),
            });
        }
    }
}

fn check_geometry(cell_width: Px, viewport_width: Px) -> Result<(), ConfigError> {
    if cell_width <= Px::ZERO || viewport_width <= Px::ZERO {
        return Err(ConfigError::InvalidGeometry {
            cell: cell_width.raw(),
            viewport: viewport_width.raw(),
        });
    }
    Ok(())
}

fn cell_count(explicit: Option<usize>, cell_width: Px, viewport_width: Px) -> usize {
    let count = explicit.unwrap_or_else(|| {
        let width = cell_width.raw();
        ((viewport_width.raw() + width - 1) / width) as usize
    });
    let count = count.max(1);
    if count % 2 == 0 { count + 1 } else { count }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use chrono_tz::Tz;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> EpochMillis {
        Tz::UTC
            .with_ymd_and_hms(y, mo, d, h, mi, 0)
            .unwrap()
            .timestamp_millis()
    }

    fn scroller(granularity: Granularity, bounds: TimeBoundaries, at: EpochMillis) -> WindowedScroller {
        WindowedScroller::new(
            ScrollerArgs::default().granularity(granularity),
            Arc::new(bounds),
            at,
        )
        .unwrap()
    }

    fn assert_adjacent(scroller: &WindowedScroller) {
        let cells = scroller.cells();
        let labeler = scroller.labeler();
        for pair in cells.windows(2) {
            assert_eq!(
                labeler.step(pair[0].display(), 1, scroller.boundaries()),
                pair[1]
            );
        }
    }

    #[test]
    fn cell_count_is_odd() {
        assert_eq!(cell_count(None, Px::new(80), Px::new(400)), 5);
        assert_eq!(cell_count(None, Px::new(100), Px::new(400)), 5);
        assert_eq!(cell_count(None, Px::new(90), Px::new(400)), 5);
        assert_eq!(cell_count(Some(6), Px::new(80), Px::new(400)), 7);
        assert_eq!(cell_count(Some(0), Px::new(80), Px::new(400)), 1);
    }

    #[test]
    fn rejects_bad_geometry() {
        let result = WindowedScroller::new(
            ScrollerArgs::default().cell_width(Px::ZERO),
            Arc::new(TimeBoundaries::default()),
            0,
        );
        assert_eq!(
            result.unwrap_err(),
            ConfigError::InvalidGeometry {
                cell: 0,
                viewport: 400
            }
        );
    }

    #[test]
    fn set_time_relabels_around_center() {
        let s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 15, 0));
        assert_eq!(s.display_time(), utc(2024, 3, 5, 0, 0));
        assert_eq!(s.cells()[0].display(), utc(2024, 3, 3, 0, 0));
        assert_eq!(s.cells()[4].display(), utc(2024, 3, 7, 0, 0));
        assert_eq!(s.current_time(), utc(2024, 3, 5, 15, 0));
        assert_adjacent(&s);
    }

    #[test]
    fn fraction_tracks_instant() {
        let s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 18, 0));
        let expected = s.center_slot().fraction_of(utc(2024, 3, 5, 18, 0));
        assert!((s.center_fraction() - expected).abs() <= 1.0 / 80.0);
    }

    #[test]
    fn one_cell_scroll_moves_one_unit() {
        let mut s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 12, 0));
        s.scroll_by(Px::new(80));
        assert_eq!(s.display_time(), utc(2024, 3, 6, 0, 0));
        s.scroll_by(Px::new(-160));
        assert_eq!(s.display_time(), utc(2024, 3, 4, 0, 0));
        assert_adjacent(&s);
    }

    #[test]
    fn small_scroll_stays_in_cell() {
        let mut s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 12, 0));
        let before = s.current_time();
        let after = s.scroll_by(Px::new(20));
        assert_eq!(s.display_time(), utc(2024, 3, 5, 0, 0));
        assert!(after > before);
        assert_eq!(s.scroll_offset(), Px::new(20));
    }

    #[test]
    fn scroll_stops_at_min_time() {
        let min = utc(2024, 3, 5, 0, 0);
        let bounds = TimeBoundaries::default().with_min_time(Some(min)).unwrap();
        let mut s = scroller(Granularity::Day, bounds, utc(2024, 3, 6, 12, 0));
        for _ in 0..10 {
            let reported = s.scroll_by(Px::new(-60));
            assert!(reported >= min);
        }
        assert_eq!(s.display_time(), utc(2024, 3, 5, 0, 0));
        assert!(s.current_time() >= min);
    }

    #[test]
    fn hitting_bound_cancels_fling() {
        let max = utc(2024, 3, 6, 0, 0);
        let bounds = TimeBoundaries::default().with_max_time(Some(max)).unwrap();
        let mut s = scroller(Granularity::Day, bounds, utc(2024, 3, 5, 12, 0));
        assert!(s.fling(3000.0));
        let mut ticks = 0;
        while s.is_flinging() {
            if let Some(reported) = s.fling_tick(Duration::from_millis(16)) {
                assert!(reported <= max);
            }
            ticks += 1;
            assert!(ticks < 500);
        }
        assert!(s.current_time() <= max);
    }

    #[test]
    fn tap_centres_tapped_cell() {
        let mut s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 12, 0));
        // Cell 4 spans 320..400 of the viewport.
        s.tap(Px::new(360));
        assert_eq!(s.display_time(), utc(2024, 3, 7, 0, 0));
    }

    #[test]
    fn begin_drag_stops_fling() {
        let mut s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 12, 0));
        assert!(s.fling(-900.0));
        assert!(s.fling_tick(Duration::from_millis(16)).is_some());
        s.begin_drag();
        assert!(!s.is_flinging());
        assert_eq!(s.fling_tick(Duration::from_millis(16)), None);
    }

    #[test]
    fn receive_absorbs_instant_inside_center() {
        let mut s = scroller(Granularity::Hour, TimeBoundaries::default(), utc(2024, 3, 5, 10, 0));
        assert_eq!(s.receive_from_child(utc(2024, 3, 5, 10, 20)), Received::Absorbed);
        assert_eq!(s.display_time(), utc(2024, 3, 5, 10, 0));
        assert_eq!(s.receive_from_parent(utc(2024, 3, 6, 14, 0)), Received::Relabeled);
        assert_eq!(s.display_time(), utc(2024, 3, 6, 14, 0));
        assert_adjacent(&s);
    }

    #[test]
    fn render_hook_sees_changed_cells() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 12, 0));
        s.set_render_slot(Some(RenderSlotWith::new(move |update: CellUpdate| {
            sink.lock().unwrap().push(update.cell);
        })));
        assert_eq!(seen.lock().unwrap().len(), 5);
        seen.lock().unwrap().clear();
        s.scroll_by(Px::new(80));
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn resize_keeps_current_time() {
        let mut s = scroller(Granularity::Day, TimeBoundaries::default(), utc(2024, 3, 5, 12, 0));
        s.resize(Px::new(240)).unwrap();
        assert_eq!(s.viewport_width(), Px::new(240));
        assert_eq!(s.display_time(), utc(2024, 3, 5, 0, 0));
        assert!(s.resize(Px::new(-1)).is_err());
    }
}
