// Sequencer Tracks - Drum steps, tracks, and the default kit
// Per-step parameters are clamped on every write path

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::styles::DrumLaneKind;

/// Allowed roll subdivisions (0 = no roll)
pub const ROLL_VALUES: [u8; 4] = [0, 2, 3, 4];

/// One cell of a drum track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumStep {
    pub active: bool,
    /// MIDI velocity (0-127)
    pub velocity: u8,
    /// Chance to fire, percent (0-100)
    pub probability: u8,
    pub flam: bool,
    /// Repeats within the step: 0, 2, 3 or 4
    pub roll: u8,
    /// Semitone offset (-12..12)
    pub pitch: i8,
}

impl Default for DrumStep {
    fn default() -> Self {
        DrumStep {
            active: false,
            velocity: 100,
            probability: 100,
            flam: false,
            roll: 0,
            pitch: 0,
        }
    }
}

impl DrumStep {
    /// An active step at the given velocity
    pub fn hit(velocity: u8) -> Self {
        DrumStep {
            active: true,
            velocity: velocity.min(127),
            ..DrumStep::default()
        }
    }
}

/// Snap a requested roll count onto the allowed values
pub fn normalize_roll(roll: u8) -> u8 {
    match roll {
        0 | 1 => 0,
        2..=4 => roll,
        _ => 4,
    }
}

/// Partial update for a single step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepPatch {
    pub active: Option<bool>,
    pub velocity: Option<u8>,
    pub probability: Option<u8>,
    pub flam: Option<bool>,
    pub roll: Option<u8>,
    pub pitch: Option<i8>,
}

impl StepPatch {
    /// Apply the present fields, clamping each to its range
    pub fn apply(&self, step: &mut DrumStep) {
        if let Some(active) = self.active {
            step.active = active;
        }
        if let Some(velocity) = self.velocity {
            step.velocity = velocity.min(127);
        }
        if let Some(probability) = self.probability {
            step.probability = probability.min(100);
        }
        if let Some(flam) = self.flam {
            step.flam = flam;
        }
        if let Some(roll) = self.roll {
            step.roll = normalize_roll(roll);
        }
        if let Some(pitch) = self.pitch {
            step.pitch = pitch.clamp(-12, 12);
        }
    }
}

/// Supported grid lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "usize", into = "usize")]
pub enum PatternLength {
    Eight,
    #[default]
    Sixteen,
    ThirtyTwo,
    SixtyFour,
}

impl PatternLength {
    pub const ALL: [PatternLength; 4] = [
        PatternLength::Eight,
        PatternLength::Sixteen,
        PatternLength::ThirtyTwo,
        PatternLength::SixtyFour,
    ];

    pub fn from_steps(steps: usize) -> Option<Self> {
        match steps {
            8 => Some(PatternLength::Eight),
            16 => Some(PatternLength::Sixteen),
            32 => Some(PatternLength::ThirtyTwo),
            64 => Some(PatternLength::SixtyFour),
            _ => None,
        }
    }

    pub fn steps(&self) -> usize {
        match self {
            PatternLength::Eight => 8,
            PatternLength::Sixteen => 16,
            PatternLength::ThirtyTwo => 32,
            PatternLength::SixtyFour => 64,
        }
    }
}

impl TryFrom<usize> for PatternLength {
    type Error = String;

    fn try_from(steps: usize) -> Result<Self, Self::Error> {
        PatternLength::from_steps(steps).ok_or_else(|| format!("unsupported pattern length {}", steps))
    }
}

impl From<PatternLength> for usize {
    fn from(length: PatternLength) -> usize {
        length.steps()
    }
}

/// A drum track: one instrument and its step grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumTrack {
    pub id: Uuid,
    pub name: String,
    /// Instrument id understood by the sound engine
    pub instrument: String,
    pub pattern: Vec<DrumStep>,
    /// 0-100
    pub volume: u8,
    /// -100 (left) .. 100 (right)
    pub pan: i8,
    pub muted: bool,
    pub solo: bool,
}

impl DrumTrack {
    pub fn new(name: impl Into<String>, instrument: impl Into<String>, length: PatternLength) -> Self {
        DrumTrack {
            id: Uuid::new_v4(),
            name: name.into(),
            instrument: instrument.into(),
            pattern: vec![DrumStep::default(); length.steps()],
            volume: 80,
            pan: 0,
            muted: false,
            solo: false,
        }
    }

    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Truncate or pad with default steps
    pub fn resize(&mut self, length: PatternLength) {
        self.pattern.resize(length.steps(), DrumStep::default());
    }

    /// Reset every step to its default
    pub fn clear(&mut self) {
        self.pattern.fill(DrumStep::default());
    }

    pub fn active_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.pattern
            .iter()
            .enumerate()
            .filter(|(_, step)| step.active)
            .map(|(index, _)| index)
    }

    /// Carry over mixer settings that live outside undo history
    pub fn copy_mix_from(&mut self, other: &DrumTrack) {
        self.volume = other.volume;
        self.pan = other.pan;
        self.muted = other.muted;
        self.solo = other.solo;
    }
}

/// Instrument ids of the default kit, in track order
pub const DEFAULT_KIT: [(&str, &str); 8] = [
    ("Kick", "kick"),
    ("Snare", "snare"),
    ("Clap", "clap"),
    ("Closed Hat", "hihat"),
    ("Open Hat", "open_hat"),
    ("Tom", "tom"),
    ("Rim", "rim"),
    ("Crash", "crash"),
];

pub fn default_kit(length: PatternLength) -> Vec<DrumTrack> {
    DEFAULT_KIT
        .iter()
        .map(|(name, instrument)| DrumTrack::new(*name, *instrument, length))
        .collect()
}

/// Kit instrument that plays a generated drum lane
pub fn lane_instrument(kind: DrumLaneKind) -> &'static str {
    match kind {
        DrumLaneKind::Kick => "kick",
        DrumLaneKind::Snare => "snare",
        DrumLaneKind::Hihat => "hihat",
        DrumLaneKind::Perc => "clap",
    }
}

/// Fill probability used by `randomize`, per instrument
pub fn random_density(instrument: &str) -> f64 {
    match instrument {
        "kick" => 0.3,
        "snare" | "clap" => 0.2,
        "hihat" => 0.5,
        "crash" => 0.05,
        _ => 0.12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_step() {
        let step = DrumStep::default();
        assert!(!step.active);
        assert_eq!(step.velocity, 100);
        assert_eq!(step.probability, 100);
        assert_eq!(step.roll, 0);
    }

    #[test]
    fn test_patch_clamps() {
        let mut step = DrumStep::default();
        StepPatch {
            velocity: Some(200),
            probability: Some(150),
            roll: Some(7),
            pitch: Some(-40),
            ..StepPatch::default()
        }
        .apply(&mut step);

        assert_eq!(step.velocity, 127);
        assert_eq!(step.probability, 100);
        assert_eq!(step.roll, 4);
        assert_eq!(step.pitch, -12);
        // Untouched fields keep their value
        assert!(!step.active);
    }

    #[test]
    fn test_normalize_roll() {
        assert_eq!(normalize_roll(1), 0);
        assert_eq!(normalize_roll(3), 3);
        for roll in 0..=10 {
            assert!(ROLL_VALUES.contains(&normalize_roll(roll)));
        }
    }

    #[test]
    fn test_pattern_length() {
        assert_eq!(PatternLength::from_steps(32), Some(PatternLength::ThirtyTwo));
        assert_eq!(PatternLength::from_steps(12), None);
        for length in PatternLength::ALL {
            assert_eq!(PatternLength::from_steps(length.steps()), Some(length));
        }

        let json = serde_json::to_string(&PatternLength::SixtyFour).unwrap();
        assert_eq!(json, "64");
        assert!(serde_json::from_str::<PatternLength>("10").is_err());
    }

    #[test]
    fn test_resize_truncates_and_pads() {
        let mut track = DrumTrack::new("Kick", "kick", PatternLength::Sixteen);
        track.pattern[3].active = true;
        track.pattern[12].active = true;

        track.resize(PatternLength::Eight);
        assert_eq!(track.len(), 8);
        assert_eq!(track.active_steps().collect::<Vec<_>>(), vec![3]);

        track.resize(PatternLength::ThirtyTwo);
        assert_eq!(track.len(), 32);
        assert!(track.pattern[8..].iter().all(|s| *s == DrumStep::default()));
    }

    #[test]
    fn test_default_kit() {
        let kit = default_kit(PatternLength::Sixteen);
        assert_eq!(kit.len(), 8);
        assert!(kit.iter().all(|t| t.len() == 16));

        // Every generated lane has a home in the kit
        for kind in DrumLaneKind::ALL {
            assert!(kit.iter().any(|t| t.instrument == lane_instrument(kind)));
        }

        // Track ids are unique
        assert_ne!(kit[0].id, kit[1].id);
    }
}
