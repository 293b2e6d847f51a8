use std::sync::{Arc, Mutex};

use chrono::TimeZone;
use chrono_tz::Tz;
use dateslider::{
    BoundaryOverrides, CallbackWith, CellUpdate, EpochMillis, Granularity, PickerChain, Px,
    RenderSlotWith, ScrollerArgs, TimeBoundaries,
};

const CELL: Px = Px::new(80);

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> EpochMillis {
    Tz::UTC
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .unwrap()
        .timestamp_millis()
}

fn day_hour_minute(bounds: TimeBoundaries, at: EpochMillis) -> PickerChain {
    PickerChain::new(
        bounds,
        [Granularity::Day, Granularity::Hour, Granularity::Minute]
            .map(|granularity| ScrollerArgs::default().granularity(granularity).cell_width(CELL)),
        at,
    )
    .unwrap()
}

fn record(chain: &mut PickerChain) -> Arc<Mutex<Vec<EpochMillis>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    chain.set_on_time_changed(Some(CallbackWith::new(move |t| {
        sink.lock().unwrap().push(t);
    })));
    seen
}

#[test]
fn minute_scroll_stays_inside_hour() {
    let bounds = TimeBoundaries::default().with_minute_interval(15).unwrap();
    let mut chain = day_hour_minute(bounds, utc(2023, 6, 15, 10, 7));

    let [day, hour, minute] = [0, 1, 2].map(|i| chain.scrollers()[i].display_time());
    assert_eq!(minute, utc(2023, 6, 15, 10, 0));
    assert_eq!(hour, utc(2023, 6, 15, 10, 0));
    assert_eq!(day, utc(2023, 6, 15, 0, 0));

    let day_cells = chain.scrollers()[0].cells().to_vec();
    let hour_cells = chain.scrollers()[1].cells().to_vec();
    let seen = record(&mut chain);

    let reported = chain.scroll_by(2, CELL).unwrap();
    assert_eq!(reported, utc(2023, 6, 15, 10, 15));
    assert_eq!(chain.scrollers()[2].display_time(), utc(2023, 6, 15, 10, 15));
    assert_eq!(chain.scrollers()[1].cells(), hour_cells.as_slice());
    assert_eq!(chain.scrollers()[0].cells(), day_cells.as_slice());
    assert_eq!(*seen.lock().unwrap(), vec![utc(2023, 6, 15, 10, 15)]);
}

#[test]
fn minute_scroll_carries_into_next_hour() {
    let bounds = TimeBoundaries::default().with_minute_interval(15).unwrap();
    let mut chain = day_hour_minute(bounds, utc(2023, 6, 15, 10, 7));
    let day_cells = chain.scrollers()[0].cells().to_vec();

    for _ in 0..4 {
        chain.scroll_by(2, CELL).unwrap();
    }
    assert_eq!(chain.current_time(), utc(2023, 6, 15, 11, 0));
    assert_eq!(chain.scrollers()[1].display_time(), utc(2023, 6, 15, 11, 0));
    assert_eq!(chain.scrollers()[0].cells(), day_cells.as_slice());
}

#[test]
fn hour_scroll_relabels_minutes_and_notifies() {
    let bounds = TimeBoundaries::default().with_minute_interval(15).unwrap();
    let mut chain = day_hour_minute(bounds, utc(2023, 6, 15, 10, 7));
    let seen = record(&mut chain);

    chain.scroll_by(1, CELL * 2).unwrap();
    assert_eq!(chain.scrollers()[1].display_time(), utc(2023, 6, 15, 12, 0));
    let minute = chain.scrollers()[2].display_time();
    assert!(minute >= utc(2023, 6, 15, 12, 0) && minute <= utc(2023, 6, 15, 12, 45));
    assert_eq!(*seen.lock().unwrap(), vec![minute]);
    assert_eq!(chain.scrollers()[0].display_time(), utc(2023, 6, 15, 0, 0));
}

#[test]
fn small_hour_scroll_reports_leaf_display() {
    let bounds = TimeBoundaries::default().with_minute_interval(15).unwrap();
    let mut chain = day_hour_minute(bounds, utc(2023, 6, 15, 10, 7));
    let seen = record(&mut chain);

    let reported = chain.scroll_by(1, Px::new(4)).unwrap();
    let hour_time = chain.scrollers()[1].current_time();
    assert!(hour_time > utc(2023, 6, 15, 10, 0) && hour_time < utc(2023, 6, 15, 10, 7));
    assert_eq!(reported, utc(2023, 6, 15, 10, 0));
    assert_eq!(reported, chain.scrollers()[2].display_time());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn hour_window_wraps_across_days() {
    let bounds = TimeBoundaries::default()
        .with_minute_interval(15)
        .unwrap()
        .with_hours(Some(9), Some(17))
        .unwrap();
    let mut chain = day_hour_minute(bounds, utc(2023, 6, 15, 17, 45));
    chain.scroll_by(2, CELL).unwrap();
    assert_eq!(chain.current_time(), utc(2023, 6, 16, 9, 0));
    assert_eq!(chain.scrollers()[1].display_time(), utc(2023, 6, 16, 9, 0));
    assert_eq!(chain.scrollers()[0].display_time(), utc(2023, 6, 16, 0, 0));

    chain.scroll_by(2, -CELL).unwrap();
    assert_eq!(chain.current_time(), utc(2023, 6, 15, 17, 45));
    assert_eq!(chain.scrollers()[0].display_time(), utc(2023, 6, 15, 0, 0));
}

#[test]
fn max_time_stops_drag_and_fling() {
    let max = utc(2023, 6, 15, 11, 0);
    let bounds = TimeBoundaries::default()
        .with_minute_interval(15)
        .unwrap()
        .with_max_time(Some(max))
        .unwrap();
    let mut chain = day_hour_minute(bounds, utc(2023, 6, 15, 10, 0));

    for _ in 0..12 {
        chain.scroll_by(2, Px::new(50)).unwrap();
        for scroller in chain.scrollers() {
            assert!(scroller.current_time() <= max);
        }
    }
    assert_eq!(chain.current_time(), max);

    chain.begin_drag(1).unwrap();
    assert!(chain.fling(1, 4000.0).unwrap());
    let mut frames = 0;
    while chain.fling_tick(std::time::Duration::from_millis(16)) {
        frames += 1;
        assert!(frames < 1_000);
    }
    assert!(chain.scrollers()[1].current_time() <= max);
    assert!(chain.current_time() <= max);
}

#[test]
fn override_merge_aligns_hours_and_bounds() {
    let mut chain = day_hour_minute(TimeBoundaries::default(), utc(2023, 6, 15, 10, 7));
    chain
        .set_time_with(
            utc(2023, 6, 15, 6, 0),
            &BoundaryOverrides::default()
                .minute_interval(120)
                .start_hour(9)
                .end_hour(17)
                .min_time(utc(2023, 6, 14, 20, 0)),
        )
        .unwrap();
    let bounds = chain.boundaries();
    assert_eq!(bounds.start_hour(), Some(10));
    assert_eq!(bounds.end_hour(), Some(17));
    // 20:00 lies past the window, so the bound moves to the last valid instant.
    assert_eq!(bounds.min_time(), Some(utc(2023, 6, 14, 17, 0) - 1));
    assert_eq!(chain.current_time(), utc(2023, 6, 15, 10, 0));
}

#[test]
fn render_hook_reports_scroller_and_cell() {
    let mut chain = day_hour_minute(TimeBoundaries::default(), utc(2023, 6, 15, 10, 7));
    let updates = Arc::new(Mutex::new(Vec::<CellUpdate>::new()));
    let sink = Arc::clone(&updates);
    chain.set_render_slot(Some(RenderSlotWith::new(move |update: CellUpdate| {
        sink.lock().unwrap().push(update);
    })));
    assert_eq!(updates.lock().unwrap().len(), 15);

    updates.lock().unwrap().clear();
    chain.scroll_by(0, CELL).unwrap();
    let updates = updates.lock().unwrap();
    assert!(updates.iter().any(|u| u.scroller == 0));
    assert!(updates.iter().any(|u| u.scroller == 2));
    let centre = updates
        .iter()
        .rev()
        .find(|u| u.scroller == 0 && u.cell == 2)
        .unwrap();
    assert_eq!(centre.slot.display(), utc(2023, 6, 16, 0, 0));
}
