#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that folds world events into session statistics.

use std::fmt;

use bounce_core::Event;

/// Statistics gathered over a play session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SessionReport {
    /// Ticks simulated.
    pub ticks: u64,
    /// Jumps started by the player.
    pub jumps: u32,
    /// Landings resolved on platforms.
    pub landings: u32,
    /// Times a wall stopped the player.
    pub wall_blocks: u32,
    /// Obstacle direction changes, limits and walls combined.
    pub obstacle_reversals: u32,
    /// Coins picked up across every attempt.
    pub coins_collected: u32,
    /// Resets, whether requested or caused by an obstacle.
    pub resets: u32,
    /// Runs that reached the goal with every coin.
    pub completions: u32,
    /// Fewest ticks between a reset and a completion.
    pub best_completion_ticks: Option<u64>,
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} jumps={} landings={} wall_blocks={} reversals={} coins={} resets={} completions={}",
            self.ticks,
            self.jumps,
            self.landings,
            self.wall_blocks,
            self.obstacle_reversals,
            self.coins_collected,
            self.resets,
            self.completions,
        )?;
        if let Some(best) = self.best_completion_ticks {
            write!(f, " best_completion_ticks={best}")?;
        }
        Ok(())
    }
}

/// Pure analytics system that accumulates a [`SessionReport`].
#[derive(Debug, Default)]
pub struct Analytics {
    report: SessionReport,
    attempt_started_at: u64,
}

impl Analytics {
    /// Creates a new analytics system with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub fn report(&self) -> &SessionReport {
        &self.report
    }

    /// Folds a batch of world events into the report.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            self.observe(event);
        }
    }

    fn observe(&mut self, event: &Event) {
        let report = &mut self.report;
        match event {
            Event::TimeAdvanced { tick } => report.ticks = *tick,
            Event::PlayerJumped => report.jumps = report.jumps.saturating_add(1),
            Event::PlayerLanded { .. } => report.landings = report.landings.saturating_add(1),
            Event::PlayerBlocked { .. } => {
                report.wall_blocks = report.wall_blocks.saturating_add(1);
            }
            Event::ObstacleReversed { .. } => {
                report.obstacle_reversals = report.obstacle_reversals.saturating_add(1);
            }
            Event::CoinCollected { .. } => {
                report.coins_collected = report.coins_collected.saturating_add(1);
            }
            Event::GameReset => {
                report.resets = report.resets.saturating_add(1);
                self.attempt_started_at = report.ticks;
            }
            Event::LevelCompleted { .. } => {
                report.completions = report.completions.saturating_add(1);
                let elapsed = report.ticks.saturating_sub(self.attempt_started_at);
                report.best_completion_ticks = Some(
                    report
                        .best_completion_ticks
                        .map_or(elapsed, |best| best.min(elapsed)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Analytics, SessionReport};
    use bounce_core::{CoinId, Event};

    #[test]
    fn completion_time_is_measured_from_the_last_reset() {
        let mut analytics = Analytics::new();
        analytics.handle(&[
            Event::TimeAdvanced { tick: 40 },
            Event::GameReset,
            Event::TimeAdvanced { tick: 100 },
            Event::LevelCompleted { coins: 3 },
            Event::GameReset,
            Event::TimeAdvanced { tick: 500 },
            Event::LevelCompleted { coins: 3 },
        ]);

        let report = analytics.report();
        assert_eq!(report.completions, 2);
        assert_eq!(report.resets, 2);
        assert_eq!(report.best_completion_ticks, Some(60));
    }

    #[test]
    fn display_lists_every_counter() {
        let report = SessionReport {
            ticks: 10,
            coins_collected: 2,
            ..SessionReport::default()
        };
        let text = report.to_string();
        assert!(text.starts_with("ticks=10 "));
        assert!(text.contains("coins=2"));
        assert!(!text.contains("best_completion_ticks"));
    }

    #[test]
    fn coin_events_are_counted_individually() {
        let mut analytics = Analytics::new();
        analytics.handle(&[
            Event::CoinCollected {
                coin: CoinId::new(0),
                total: 1,
            },
            Event::CoinCollected {
                coin: CoinId::new(2),
                total: 2,
            },
        ]);
        assert_eq!(analytics.report().coins_collected, 2);
    }
}
