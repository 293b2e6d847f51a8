//! Drives a day/hour/minute picker chain headlessly and logs what a host
//! would render.
//!
//! Run with `RUST_LOG=dateslider=debug` to see the chain's own spans.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use dateslider::{
    CallbackWith, CellUpdate, ConfigError, EpochMillis, Granularity, PickerChain, Px,
    RenderSlotWith, ScrollerArgs, TimeBoundaries,
};
use tracing::info;

const CELL: Px = Px::new(72);
const FRAME: Duration = Duration::from_millis(16);

fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,dateslider=info,example=info") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .try_init();
}

fn print_chain(chain: &PickerChain) {
    for scroller in chain.scrollers() {
        let labels: Vec<&str> = scroller.cells().iter().map(|slot| slot.label()).collect();
        info!(
            granularity = ?scroller.granularity(),
            center = scroller.center_slot().label(),
            "{}",
            labels.join(" | ")
        );
    }
}

fn main() -> Result<(), ConfigError> {
    init_tracing();

    let now = Utc::now().timestamp_millis();
    let bounds = TimeBoundaries::new(Berlin)
        .with_minute_interval(15)?
        .with_hours(Some(8), Some(20))?
        .with_min_time(Some(now - 7 * 24 * 3_600_000))?;

    let mut chain = PickerChain::new(
        bounds,
        [Granularity::Day, Granularity::Hour, Granularity::Minute].map(|granularity| {
            ScrollerArgs::default()
                .granularity(granularity)
                .cell_width(CELL)
                .viewport_width(Px::new(360))
        }),
        now,
    )?;

    chain.set_on_time_changed(Some(CallbackWith::new(|millis: EpochMillis| {
        if let Some(time) = Berlin.timestamp_millis_opt(millis).single() {
            info!(time = %time.format("%a %d %b %H:%M"), "time changed");
        }
    })));
    chain.set_render_slot(Some(RenderSlotWith::new(|update: CellUpdate| {
        tracing::trace!(
            scroller = update.scroller,
            cell = update.cell,
            label = update.slot.label(),
            "cell bound"
        );
    })));
    print_chain(&chain);

    info!("dragging minutes forward by three cells");
    chain.begin_drag(2)?;
    for _ in 0..3 {
        chain.scroll_by(2, CELL)?;
    }
    print_chain(&chain);

    info!("tapping the cell right of the hour centre");
    chain.tap(1, CELL * 3 + CELL / 2)?;
    print_chain(&chain);

    info!("flinging the day scroller backwards");
    chain.begin_drag(0)?;
    if chain.fling(0, -1_800.0)? {
        let mut frames = 0;
        while chain.fling_tick(FRAME) {
            frames += 1;
        }
        info!(frames, "fling settled");
    }
    print_chain(&chain);

    Ok(())
}
