// Musical Grid - Time signature and sixteenth-note step arithmetic
// Provides structure for generation and playback timing

use serde::{Deserialize, Serialize};

/// Sixteenth-note steps in one bar
pub const STEPS_PER_BAR: usize = 16;

/// Bars produced by one generation
pub const GENERATED_BARS: usize = 4;

/// Steps covered by one generation (global steps run 0..GENERATED_STEPS)
pub const GENERATED_STEPS: usize = STEPS_PER_BAR * GENERATED_BARS;

/// Tempo bounds applied to every tempo input
pub const MIN_BPM: f64 = 40.0;
pub const MAX_BPM: f64 = 300.0;

/// Musical time signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeSignature {
    /// 4/4 time - most common (4 beats per bar)
    #[default]
    #[serde(rename = "4/4")]
    FourFour,

    /// 3/4 time - waltz feel (3 beats per bar)
    #[serde(rename = "3/4")]
    ThreeFour,

    /// 6/8 time - compound feel
    #[serde(rename = "6/8")]
    SixEight,
}

impl TimeSignature {
    /// Parse from "4/4" style notation
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "4/4" => Some(TimeSignature::FourFour),
            "3/4" => Some(TimeSignature::ThreeFour),
            "6/8" => Some(TimeSignature::SixEight),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSignature::FourFour => "4/4",
            TimeSignature::ThreeFour => "3/4",
            TimeSignature::SixEight => "6/8",
        }
    }

    /// Get number of beats per bar
    pub fn beats_per_bar(&self) -> u8 {
        match self {
            TimeSignature::FourFour => 4,
            TimeSignature::ThreeFour => 3,
            TimeSignature::SixEight => 6,
        }
    }

    /// Denominator as a power of two (MIDI meta encoding)
    pub fn beat_unit_power(&self) -> u8 {
        match self {
            TimeSignature::FourFour | TimeSignature::ThreeFour => 2,
            TimeSignature::SixEight => 3,
        }
    }
}

/// Clamp a tempo into the supported range
pub fn clamp_bpm(bpm: f64) -> f64 {
    if bpm.is_nan() {
        return MIN_BPM;
    }
    bpm.clamp(MIN_BPM, MAX_BPM)
}

/// Duration of one sixteenth note in seconds
pub fn step_duration_secs(bpm: f64) -> f64 {
    60.0 / clamp_bpm(bpm) / 4.0
}

/// Global step index for a bar/step pair
pub fn global_step(bar: usize, step: usize) -> usize {
    bar * STEPS_PER_BAR + step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_signature_labels() {
        assert_eq!(TimeSignature::from_label("4/4"), Some(TimeSignature::FourFour));
        assert_eq!(TimeSignature::from_label(" 3/4 "), Some(TimeSignature::ThreeFour));
        assert_eq!(TimeSignature::from_label("5/4"), None);
        assert_eq!(TimeSignature::SixEight.label(), "6/8");
    }

    #[test]
    fn test_time_signature_beats() {
        assert_eq!(TimeSignature::FourFour.beats_per_bar(), 4);
        assert_eq!(TimeSignature::ThreeFour.beats_per_bar(), 3);
    }

    #[test]
    fn test_time_signature_serializes_as_label() {
        let json = serde_json::to_string(&TimeSignature::FourFour).unwrap();
        assert_eq!(json, "\"4/4\"");
    }

    #[test]
    fn test_step_duration_120_bpm() {
        // At 120 BPM a quarter note is 500ms, a sixteenth 125ms
        assert!((step_duration_secs(120.0) - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_bpm() {
        assert_eq!(clamp_bpm(10.0), MIN_BPM);
        assert_eq!(clamp_bpm(500.0), MAX_BPM);
        assert_eq!(clamp_bpm(128.0), 128.0);
        assert_eq!(clamp_bpm(f64::NAN), MIN_BPM);
    }

    #[test]
    fn test_global_step() {
        assert_eq!(global_step(0, 0), 0);
        assert_eq!(global_step(3, 15), 63);
    }
}
