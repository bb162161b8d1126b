// Deterministic pseudo-random number generator for the colony simulation.
//
// xoshiro256++ (Blackman & Vigna, 2019) seeded through SplitMix64. Every
// random decision in `formica_sim` (wander turns, caste rolls, patch
// placement, respawn rolls, boundary jitter) draws from one `GameRng` owned
// by the sim state, so a seed fully determines a match.
//
// The float helpers never panic on a degenerate range: an empty or inverted
// range returns its lower bound. Tunables come from a user-editable JSON
// config and the per-tick agent code must not be able to abort a tick because
// somebody set `jitter = 0`.
//
// **Critical constraint: determinism.** The core generator uses only integer
// arithmetic. Float conversions take a fixed number of high bits so the same
// state yields the same `f32`/`f64` on every platform.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Xoshiro256++ PRNG, the simulation's only source of randomness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Create a generator from a `u64` seed. Equal seeds give equal streams.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Next raw `u64`.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform `f32` in [0, 1), built from the top 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform `f64` in [0, 1), built from the top 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform `f32` in `[low, high)`. Returns `low` when the range is empty.
    pub fn range_f32(&mut self, low: f32, high: f32) -> f32 {
        if !(low < high) {
            return low;
        }
        low + self.next_f32() * (high - low)
    }

    /// Uniform `f32` in `[-amount, amount)`. Zero or negative `amount`
    /// returns 0 without consuming state.
    pub fn jitter(&mut self, amount: f32) -> f32 {
        if !(amount > 0.0) {
            return 0.0;
        }
        self.range_f32(-amount, amount)
    }

    /// Uniform heading in `[0, TAU)`.
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * TAU
    }

    /// Uniform integer in `[low, high)` via rejection sampling (no modulo
    /// bias). Returns `low` when the range is empty.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform `usize` in `[low, high)`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// `true` with probability `p`. `p <= 0` is always false, `p >= 1`
    /// always true.
    pub fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// SplitMix64 step, used only to expand the seed.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(7);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = GameRng::new(7);
        let mut b = GameRng::new(8);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn unit_floats_stay_in_range() {
        let mut rng = GameRng::new(12345);
        for _ in 0..10_000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f), "f32 out of range: {f}");
            let d = rng.next_f64();
            assert!((0.0..1.0).contains(&d), "f64 out of range: {d}");
        }
    }

    #[test]
    fn range_f32_within_bounds() {
        let mut rng = GameRng::new(777);
        for _ in 0..10_000 {
            let v = rng.range_f32(0.25, 0.75);
            assert!((0.25..0.75).contains(&v), "range_f32 out of range: {v}");
        }
    }

    #[test]
    fn degenerate_ranges_return_low() {
        let mut rng = GameRng::new(1);
        assert_eq!(rng.range_f32(2.0, 2.0), 2.0);
        assert_eq!(rng.range_f32(3.0, 1.0), 3.0);
        assert_eq!(rng.range_u64(5, 5), 5);
        assert_eq!(rng.range_usize(9, 4), 9);
        assert_eq!(rng.jitter(0.0), 0.0);
        assert_eq!(rng.jitter(-1.0), 0.0);
    }

    #[test]
    fn jitter_is_symmetric_and_bounded() {
        let mut rng = GameRng::new(31);
        let mut saw_negative = false;
        let mut saw_positive = false;
        for _ in 0..1000 {
            let j = rng.jitter(0.3);
            assert!((-0.3..0.3).contains(&j), "jitter out of range: {j}");
            saw_negative |= j < 0.0;
            saw_positive |= j > 0.0;
        }
        assert!(saw_negative && saw_positive);
    }

    #[test]
    fn angle_covers_full_turn() {
        let mut rng = GameRng::new(4);
        let mut max = 0.0f32;
        for _ in 0..10_000 {
            let a = rng.angle();
            assert!((0.0..TAU).contains(&a));
            max = max.max(a);
        }
        assert!(max > TAU * 0.9);
    }

    #[test]
    fn range_usize_within_bounds() {
        let mut rng = GameRng::new(555);
        for _ in 0..10_000 {
            let v = rng.range_usize(5, 15);
            assert!((5..15).contains(&v), "range_usize out of range: {v}");
        }
    }

    #[test]
    fn random_bool_tracks_probability() {
        let mut rng = GameRng::new(42);
        let n = 10_000;
        let hits = (0..n).filter(|_| rng.random_bool(0.2)).count();
        let pct = hits as f64 / n as f64;
        assert!((0.17..0.23).contains(&pct), "expected ~20%, got {pct}");
    }

    #[test]
    fn random_bool_extremes() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            assert!(!rng.random_bool(0.0));
            assert!(rng.random_bool(1.0));
        }
    }

    #[test]
    fn state_survives_json() {
        let mut rng = GameRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: GameRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
