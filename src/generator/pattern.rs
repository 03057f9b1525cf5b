// Generated Pattern - Immutable output of the pattern assembler
// Plain serializable records; collaborators copy values out of them

use serde::{Deserialize, Serialize};

use crate::groove::grid::TimeSignature;
use crate::styles::DrumLaneKind;

/// A drum hit at a global step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumEvent {
    pub step: usize,
    #[serde(rename = "type")]
    pub kind: DrumLaneKind,
}

/// A single pitched note (bass or melody)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub step: usize,
    /// MIDI note number
    pub note: u8,
    /// Length in steps
    pub duration: u32,
}

/// A sustained chord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub step: usize,
    pub notes: Vec<u8>,
    pub duration: u32,
}

/// Four bars of drums, bass, chords and melody
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPattern {
    pub style: String,
    pub bpm: f64,
    pub key: String,
    pub time_signature: TimeSignature,
    pub drums: Vec<DrumEvent>,
    pub bass: Vec<NoteEvent>,
    pub chords: Vec<ChordEvent>,
    pub melody: Vec<NoteEvent>,
    pub seed: u64,
    pub is_fallback: bool,
    pub warnings: Vec<String>,
}

impl GeneratedPattern {
    /// Drum events of one lane
    pub fn drums_of(&self, kind: DrumLaneKind) -> impl Iterator<Item = &DrumEvent> + '_ {
        self.drums.iter().filter(move |e| e.kind == kind)
    }

    /// Highest step touched by any event, including note tails
    pub fn last_step(&self) -> usize {
        let drums = self.drums.iter().map(|e| e.step);
        let notes = self
            .bass
            .iter()
            .chain(self.melody.iter())
            .map(|n| n.step + n.duration.saturating_sub(1) as usize);
        let chords = self
            .chords
            .iter()
            .map(|c| c.step + c.duration.saturating_sub(1) as usize);
        drums.chain(notes).chain(chords).max().unwrap_or(0)
    }
}

/// Optional caller overrides for a generation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOverrides {
    /// Explicit tempo, used as-is after clamping to [40, 300]
    pub tempo: Option<f64>,
    /// "4/4", "3/4" or "6/8"
    pub time_signature: Option<String>,
    /// Key root such as "F#" or "Bb"
    pub key: Option<String>,
    pub random_seed: Option<u64>,
    /// Why the caller fell back to procedural generation
    pub fallback_reason: Option<String>,
}

impl GenerateOverrides {
    pub fn with_seed(seed: u64) -> Self {
        GenerateOverrides {
            random_seed: Some(seed),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pattern() -> GeneratedPattern {
        GeneratedPattern {
            style: "House".to_string(),
            bpm: 124.0,
            key: "F".to_string(),
            time_signature: TimeSignature::FourFour,
            drums: vec![DrumEvent { step: 0, kind: DrumLaneKind::Kick }],
            bass: vec![NoteEvent { step: 2, note: 41, duration: 2 }],
            chords: vec![ChordEvent { step: 0, notes: vec![65, 68, 72], duration: 16 }],
            melody: vec![],
            seed: 1,
            is_fallback: true,
            warnings: vec![],
        }
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample_pattern()).unwrap();
        assert_eq!(value["timeSignature"], "4/4");
        assert_eq!(value["isFallback"], true);
        assert_eq!(value["drums"][0]["type"], "kick");
        assert_eq!(value["chords"][0]["duration"], 16);
    }

    #[test]
    fn test_last_step_includes_tails() {
        assert_eq!(sample_pattern().last_step(), 15);
    }

    #[test]
    fn test_overrides_from_camel_case() {
        let overrides: GenerateOverrides =
            serde_json::from_str(r#"{ "randomSeed": 42, "tempo": 140 }"#).unwrap();
        assert_eq!(overrides.random_seed, Some(42));
        assert_eq!(overrides.tempo, Some(140.0));
        assert!(overrides.key.is_none());
    }
}
