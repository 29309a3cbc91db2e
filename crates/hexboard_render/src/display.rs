use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::driver::FrameSink;
use crate::screen::Screen;
use crate::BoardError;

/// Default display refresh interval.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(20);
/// How long the device may keep failing before the loop gives up.
pub const DEFAULT_FAILURE_BUDGET: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    pub period: Duration,
    /// Consecutive failed writes tolerated before the device counts as lost.
    pub max_consecutive_failures: u32,
    /// Wall time a run of failures may last, however slow each failing write is.
    pub failure_budget: Duration,
}

impl LoopConfig {
    /// Tolerate failures for `budget`, or `budget` worth of periods, whichever ends
    /// first. At least one failure is always tolerated.
    pub fn with_failure_budget(period: Duration, budget: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let periods = (budget.as_nanos() / period.as_nanos()).clamp(1, u128::from(u32::MAX));
        Self { period, max_consecutive_failures: periods as u32, failure_budget: budget }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self::with_failure_budget(DEFAULT_PERIOD, DEFAULT_FAILURE_BUDGET)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub failures: u64,
}

/// Render `screen` into `sink` once per period until `stop` is set, then write one
/// dark frame. Write failures are logged and retried on the next period; a run of
/// `max_consecutive_failures`, or one lasting longer than `failure_budget`, ends the
/// loop with [`BoardError::DeviceLost`].
pub fn run_display<S, K>(
    screen: &mut S,
    sink: &mut K,
    config: &LoopConfig,
    stop: &AtomicBool,
) -> Result<LoopStats, BoardError>
where
    S: Screen + ?Sized,
    K: FrameSink + ?Sized,
{
    let mut stats = LoopStats::default();
    let mut consecutive = 0u32;
    let mut failing_since: Option<Instant> = None;
    let mut next = Instant::now();

    info!("display loop running every {:?}", config.period);

    while !stop.load(Ordering::Acquire) {
        let frame = screen.render();
        match sink.write_frame(&frame) {
            Ok(()) => {
                consecutive = 0;
                failing_since = None;
                stats.frames += 1;
            },
            Err(err) => {
                let since = *failing_since.get_or_insert_with(Instant::now);
                consecutive += 1;
                stats.failures += 1;
                warn!("frame write failed ({consecutive} in a row): {err}");
                if consecutive >= config.max_consecutive_failures
                    || since.elapsed() >= config.failure_budget
                {
                    error!("giving up on device after {consecutive} consecutive failures");
                    return Err(BoardError::DeviceLost(consecutive));
                }
            },
        }

        next += config.period;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // Running behind; drop the missed ticks instead of bursting.
            next = now;
        }
    }

    sink.write_frame(&vec![0.0; screen.segment_count()])?;
    info!("display loop stopped after {} frames", stats.frames);
    Ok(stats)
}
