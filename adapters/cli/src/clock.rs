//! Fixed-step clock that turns real frame time into simulation ticks.

use std::time::Duration;

/// Duration of a single simulation tick.
pub(crate) const TICK: Duration = Duration::from_micros(16_667);

/// Upper bound on ticks run for a single frame.
const MAX_TICKS_PER_FRAME: u32 = 5;

/// Accumulates frame time and releases it in whole ticks.
#[derive(Debug, Default)]
pub(crate) struct TickClock {
    accumulator: Duration,
}

impl TickClock {
    /// Adds a frame's elapsed time and returns how many ticks to simulate.
    ///
    /// Time left over after the per-frame cap is discarded so that a long stall
    /// does not turn into a burst of catch-up ticks.
    pub(crate) fn advance(&mut self, frame: Duration) -> u32 {
        self.accumulator += frame;

        let mut ticks = 0;
        while self.accumulator >= TICK && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= TICK;
            ticks += 1;
        }

        if self.accumulator >= TICK {
            log::debug!(
                "dropping {:.1}ms of simulation time",
                self.accumulator.as_secs_f64() * 1_000.0
            );
            self.accumulator = Duration::ZERO;
        }
        ticks
    }
}
