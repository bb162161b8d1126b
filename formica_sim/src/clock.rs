// Fixed-timestep accumulator for real-time drivers.
//
// The sim itself has no notion of wall time: `SimState::step()` advances
// exactly one tick. A frontend that renders at an arbitrary frame rate feeds
// each frame's elapsed time into a `TickAccumulator`, which converts it into
// a whole number of ticks at the current speed multiplier and carries the
// remainder to the next frame.
//
// After a stall (debugger break, window drag, slow frame) the backlog could
// be hundreds of ticks. `advance()` releases at most `max_catchup_ticks` per
// call and drops the rest, so the sim slows down instead of spiralling.
//
// See also: `sim.rs` (`SimState::run_frame`), `config.rs` for
// `tick_duration_ms` and `max_catchup_ticks`.

use crate::config::GameConfig;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct TickAccumulator {
    tick_duration: Duration,
    max_catchup: u32,
    backlog: Duration,
    dropped: u64,
}

impl TickAccumulator {
    pub fn new(tick_duration: Duration, max_catchup: u32) -> Self {
        Self {
            tick_duration,
            max_catchup: max_catchup.max(1),
            backlog: Duration::ZERO,
            dropped: 0,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            Duration::from_millis(u64::from(config.tick_duration_ms)),
            config.max_catchup_ticks,
        )
    }

    /// Feed `elapsed` real time at `multiplier`× speed and return how many
    /// ticks to run now.
    pub fn advance(&mut self, elapsed: Duration, multiplier: u32) -> u32 {
        if self.tick_duration.is_zero() || multiplier == 0 {
            return 0;
        }
        self.backlog = self
            .backlog
            .saturating_add(elapsed.saturating_mul(multiplier));

        let owed = self.backlog.as_nanos() / self.tick_duration.as_nanos();
        let run = owed.min(u128::from(self.max_catchup)) as u32;
        if owed > u128::from(run) {
            // Forget the backlog past the cap, keep the sub-tick remainder.
            self.dropped += (owed - u128::from(run)) as u64;
            let nanos = self.backlog.as_nanos() % self.tick_duration.as_nanos();
            self.backlog = Duration::from_nanos(nanos as u64);
        } else {
            self.backlog -= self.tick_duration * run;
        }
        run
    }

    /// Discard any partial tick (e.g. on unpause).
    pub fn reset(&mut self) {
        self.backlog = Duration::ZERO;
    }

    /// Time banked toward the next tick.
    pub fn backlog(&self) -> Duration {
        self.backlog
    }

    /// Ticks discarded by the catch-up cap so far.
    pub fn dropped_ticks(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn whole_ticks_released_and_remainder_kept() {
        let mut acc = TickAccumulator::new(ms(50), 8);
        assert_eq!(acc.advance(ms(30), 1), 0);
        assert_eq!(acc.advance(ms(30), 1), 1);
        assert_eq!(acc.backlog(), ms(10));
        assert_eq!(acc.advance(ms(140), 1), 3);
        assert_eq!(acc.backlog(), ms(0));
    }

    #[test]
    fn multiplier_scales_ticks_per_frame() {
        let mut acc = TickAccumulator::new(ms(50), 8);
        assert_eq!(acc.advance(ms(50), 4), 4);
        assert_eq!(acc.advance(ms(50), 8), 8);
    }

    #[test]
    fn catchup_is_capped_and_backlog_dropped() {
        let mut acc = TickAccumulator::new(ms(50), 8);
        assert_eq!(acc.advance(Duration::from_secs(10), 1), 8);
        assert_eq!(acc.dropped_ticks(), 192);
        // The stall doesn't leak into the next frame.
        assert_eq!(acc.advance(ms(50), 1), 1);
    }

    #[test]
    fn zero_multiplier_runs_nothing() {
        let mut acc = TickAccumulator::new(ms(50), 8);
        assert_eq!(acc.advance(ms(500), 0), 0);
        assert_eq!(acc.backlog(), Duration::ZERO);
    }

    #[test]
    fn from_config_uses_tick_duration() {
        let config = GameConfig::default();
        let mut acc = TickAccumulator::from_config(&config);
        let one_tick = ms(u64::from(config.tick_duration_ms));
        assert_eq!(acc.advance(one_tick, 1), 1);
    }
}
