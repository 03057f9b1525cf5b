// Seeded RNG - Deterministic pseudo-random source for generation and playback
// Mulberry32 mixing over a 32-bit state, identical on every platform

use chrono::Utc;
use serde::{Deserialize, Serialize};

const GOLDEN_GAMMA: u32 = 0x6D2B_79F5;

/// Advance a raw RNG state by one draw
///
/// Returns a value in [0, 1) and the state to feed into the next call.
/// Integer-only mixing keeps the sequence bit-for-bit reproducible.
pub fn next(state: u32) -> (f64, u32) {
    let new_state = state.wrapping_add(GOLDEN_GAMMA);
    let mut t = new_state;
    t = (t ^ (t >> 15)).wrapping_mul(t | 1);
    t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
    let r = t ^ (t >> 14);
    (r as f64 / 4_294_967_296.0, new_state)
}

/// Stateful wrapper around [`next`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    /// Create a generator from a 64-bit seed (high and low halves are folded together)
    pub fn new(seed: u64) -> Self {
        SeededRng {
            state: (seed ^ (seed >> 32)) as u32,
        }
    }

    /// Uniform value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        let (value, state) = next(self.state);
        self.state = state;
        value
    }

    /// Uniform integer in [low, high] (inclusive on both ends)
    pub fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            // Still consume a draw so the sequence shape doesn't depend on the bounds
            self.next_f64();
            return low;
        }
        let span = (high - low + 1) as f64;
        low + (self.next_f64() * span).floor() as i32
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform index in [0, len); returns 0 for empty collections
    pub fn pick_index(&mut self, len: usize) -> usize {
        let value = self.next_f64();
        if len == 0 {
            return 0;
        }
        ((value * len as f64).floor() as usize).min(len - 1)
    }
}

/// Seed derived from the wall clock, for callers that want a fresh draw
pub fn clock_seed() -> u64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .map(|nanos| nanos as u64)
        .unwrap_or_else(|| now.timestamp_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let same = (0..32).filter(|_| a.next_f64() == b.next_f64()).count();
        assert!(same < 32);
    }

    #[test]
    fn test_pure_step_matches_wrapper() {
        let mut rng = SeededRng::new(7);
        let (value, state) = next(7);
        assert_eq!(rng.next_f64(), value);

        let (second, _) = next(state);
        assert_eq!(rng.next_f64(), second);
    }

    #[test]
    fn test_values_in_unit_interval() {
        let mut rng = SeededRng::new(0xDEAD_BEEF);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_range_i32_bounds() {
        let mut rng = SeededRng::new(99);
        let mut seen = [false; 7];
        for _ in 0..2000 {
            let v = rng.range_i32(-3, 3);
            assert!((-3..=3).contains(&v));
            seen[(v + 3) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_degenerate_range_still_advances() {
        let mut a = SeededRng::new(5);
        let mut b = SeededRng::new(5);
        assert_eq!(a.range_i32(4, 4), 4);
        b.next_f64();
        assert_eq!(a.next_f64(), b.next_f64());
    }

    #[test]
    fn test_pick_index() {
        let mut rng = SeededRng::new(3);
        for _ in 0..500 {
            assert!(rng.pick_index(4) < 4);
        }
        assert_eq!(rng.pick_index(0), 0);
    }
}
