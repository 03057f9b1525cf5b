// Groove Feel - Swing timing and backbeat accentuation
// Pure helpers shared by the scheduler and its tests

use std::time::Duration;

use super::grid::step_duration_secs;

/// Maximum stretch of an off-beat step at 100% swing
pub const MAX_SWING_STRETCH: f64 = 0.33;

/// Interval until the next step, with swing applied to odd steps
///
/// `swing` is a percentage [0, 100]; odd steps are lengthened by up to
/// 33% of the base sixteenth at full swing.
pub fn swing_interval(bpm: f64, step: usize, swing: f64) -> Duration {
    let base = step_duration_secs(bpm);
    let swing = swing.clamp(0.0, 100.0);
    let secs = if step % 2 == 1 && swing > 0.0 {
        base * (1.0 + MAX_SWING_STRETCH * swing / 100.0)
    } else {
        base
    };
    Duration::from_secs_f64(secs)
}

/// Steps 2 and 3 of every beat carry the backbeat accent
pub fn is_backbeat(step: usize) -> bool {
    matches!(step % 4, 2 | 3)
}

/// Apply groove accentuation to a step velocity
///
/// Backbeat steps are boosted by up to 50% at full groove, the rest are
/// softened by up to 15%. Result is clamped to [0, 127].
pub fn groove_velocity(velocity: u8, step: usize, groove: f64) -> u8 {
    let groove = groove.clamp(0.0, 100.0);
    let direction = if is_backbeat(step) { 1.0 } else { -0.3 };
    let boost = 1.0 + (groove / 200.0) * direction;
    (velocity as f64 * boost).round().clamp(0.0, 127.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_swing_gives_uniform_intervals() {
        let even = swing_interval(120.0, 0, 0.0);
        let odd = swing_interval(120.0, 1, 0.0);
        assert_eq!(even, odd);
        assert!((even.as_secs_f64() - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_full_swing_stretches_odd_steps() {
        let base = swing_interval(120.0, 0, 100.0).as_secs_f64();
        let odd = swing_interval(120.0, 1, 100.0).as_secs_f64();
        assert!((odd / base - 1.33).abs() < 1e-6);

        // Even steps are untouched
        assert!((base - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_half_swing() {
        let odd = swing_interval(120.0, 3, 50.0).as_secs_f64();
        assert!((odd - 0.125 * 1.165).abs() < 1e-6);
    }

    #[test]
    fn test_backbeat_steps() {
        let backbeats: Vec<usize> = (0..8).filter(|&s| is_backbeat(s)).collect();
        assert_eq!(backbeats, vec![2, 3, 6, 7]);
    }

    #[test]
    fn test_groove_boosts_backbeat() {
        let flat = groove_velocity(100, 2, 0.0);
        let grooved = groove_velocity(100, 2, 100.0);
        assert_eq!(flat, 100);
        assert!(grooved >= flat);
        assert_eq!(grooved, 127); // 150 clamped
    }

    #[test]
    fn test_groove_softens_downbeats() {
        assert_eq!(groove_velocity(100, 0, 100.0), 85);
    }

    #[test]
    fn test_groove_never_exceeds_midi_range() {
        for velocity in [0u8, 64, 120, 127] {
            for step in 0..16 {
                assert!(groove_velocity(velocity, step, 100.0) <= 127);
            }
        }
    }
}
