// Style Type Definitions
// Styles bundle tempo, key, scale and the pattern templates the assembler samples

use serde::{Deserialize, Serialize};

use crate::groove::grid::STEPS_PER_BAR;

/// Rest sentinel in bass and melody degree patterns
pub const REST: i8 = -1;

/// Sharp-spelled pitch class names, index = semitones above C
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Musical scales available to styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Major,
    Minor,
}

impl Scale {
    /// Semitone offsets of the seven scale degrees
    pub fn intervals(&self) -> [i32; 7] {
        match self {
            Scale::Major => [0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => [0, 2, 3, 5, 7, 8, 10],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "major",
            Scale::Minor => "minor",
        }
    }
}

/// The four drum lanes of a generated pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrumLaneKind {
    Kick,
    Snare,
    Hihat,
    Perc,
}

impl DrumLaneKind {
    pub const ALL: [DrumLaneKind; 4] = [
        DrumLaneKind::Kick,
        DrumLaneKind::Snare,
        DrumLaneKind::Hihat,
        DrumLaneKind::Perc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DrumLaneKind::Kick => "kick",
            DrumLaneKind::Snare => "snare",
            DrumLaneKind::Hihat => "hihat",
            DrumLaneKind::Perc => "perc",
        }
    }

    /// General MIDI percussion note for this lane
    pub fn gm_note(&self) -> u8 {
        match self {
            DrumLaneKind::Kick => 36,  // C1
            DrumLaneKind::Snare => 38, // D1
            DrumLaneKind::Hihat => 42, // F#1 closed hat
            DrumLaneKind::Perc => 39,  // D#1 clap
        }
    }

    /// Whether the lane keeps its template position regardless of rotation
    pub fn is_anchored(&self) -> bool {
        matches!(self, DrumLaneKind::Kick | DrumLaneKind::Snare)
    }
}

/// Four boolean lanes of one bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrumPattern {
    pub kick: [bool; STEPS_PER_BAR],
    pub snare: [bool; STEPS_PER_BAR],
    pub hihat: [bool; STEPS_PER_BAR],
    pub perc: [bool; STEPS_PER_BAR],
}

impl DrumPattern {
    /// Build a pattern from step-index lists
    pub fn from_hits(kick: &[usize], snare: &[usize], hihat: &[usize], perc: &[usize]) -> Self {
        DrumPattern {
            kick: lane_from_hits(kick),
            snare: lane_from_hits(snare),
            hihat: lane_from_hits(hihat),
            perc: lane_from_hits(perc),
        }
    }

    pub fn lane(&self, kind: DrumLaneKind) -> &[bool; STEPS_PER_BAR] {
        match kind {
            DrumLaneKind::Kick => &self.kick,
            DrumLaneKind::Snare => &self.snare,
            DrumLaneKind::Hihat => &self.hihat,
            DrumLaneKind::Perc => &self.perc,
        }
    }

    /// Total active steps across all lanes
    pub fn density(&self) -> usize {
        DrumLaneKind::ALL
            .iter()
            .map(|&k| self.lane(k).iter().filter(|&&on| on).count())
            .sum()
    }
}

fn lane_from_hits(hits: &[usize]) -> [bool; STEPS_PER_BAR] {
    let mut lane = [false; STEPS_PER_BAR];
    for &step in hits {
        if step < STEPS_PER_BAR {
            lane[step] = true;
        }
    }
    lane
}

/// Sixteen scale degrees; [`REST`] marks silence
pub type DegreePattern = [i8; STEPS_PER_BAR];

/// Ordered chords (semitone interval sets from the key root), cycled per bar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordProgression {
    pub chords: Vec<Vec<i32>>,
}

impl ChordProgression {
    /// Chord used for a given bar
    pub fn chord_for_bar(&self, bar: usize) -> &[i32] {
        if self.chords.is_empty() {
            return &[];
        }
        &self.chords[bar % self.chords.len()]
    }

    /// Root interval of the chord used for a given bar
    pub fn root_for_bar(&self, bar: usize) -> i32 {
        self.chord_for_bar(bar).first().copied().unwrap_or(0)
    }
}

/// Named drum templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrumPatternId {
    LofiSwing,
    TrapHalftime,
    FourOnFloor,
    BoomBap,
    Breakbeat,
    Sparse,
}

/// Named bass degree templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BassPatternId {
    LazyRoots,
    SlidingEights,
    OffbeatPump,
    Walking,
    Rolling,
    Drone,
}

/// Named chord progressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordProgressionId {
    JazzyMinor,
    DarkMinor,
    PopMajor,
    SoulMinor,
    Epic,
    Suspended,
}

/// Complete style definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleConfig {
    pub name: &'static str,
    pub bpm: u32,
    /// Pitch class of the key root (0 = C)
    pub key: u8,
    pub scale: Scale,
    pub drum_pattern: DrumPatternId,
    pub bass_pattern: BassPatternId,
    pub chord_progression: ChordProgressionId,
}

impl StyleConfig {
    pub fn key_name(&self) -> &'static str {
        key_name(self.key)
    }
}

/// Style summary for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleSummary {
    pub name: String,
    pub description: String,
    pub bpm: u32,
    pub key: String,
    pub scale: Scale,
}

// Helper functions for key handling

/// Parse a key name ("C", "F#", "Bb", "a") into a pitch class
pub fn parse_key(key: &str) -> Option<u8> {
    let key = key.trim();
    let mut chars = key.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let accidental = match chars.as_str() {
        "" => 0,
        "#" | "♯" => 1,
        "b" | "♭" => -1,
        _ => return None,
    };

    Some((base + accidental).rem_euclid(12) as u8)
}

/// Sharp-spelled name of a pitch class
pub fn key_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES[(pitch_class % 12) as usize]
}

/// Split a MIDI note into a pitch name and octave (60 = C4)
pub fn midi_to_note_name(midi: u8) -> (&'static str, i8) {
    let octave = (midi / 12) as i8 - 1;
    (NOTE_NAMES[(midi % 12) as usize], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_have_seven_degrees_from_zero() {
        for scale in [Scale::Major, Scale::Minor] {
            let intervals = scale.intervals();
            assert_eq!(intervals.len(), 7);
            assert_eq!(intervals[0], 0);
            assert!(intervals.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("C"), Some(0));
        assert_eq!(parse_key("f#"), Some(6));
        assert_eq!(parse_key("Bb"), Some(10));
        assert_eq!(parse_key("Cb"), Some(11));
        assert_eq!(parse_key(" A "), Some(9));
        assert_eq!(parse_key("H"), None);
        assert_eq!(parse_key("C##"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn test_midi_to_note_name() {
        assert_eq!(midi_to_note_name(60), ("C", 4));
        assert_eq!(midi_to_note_name(69), ("A", 4));
        assert_eq!(midi_to_note_name(0), ("C", -1));
    }

    #[test]
    fn test_drum_pattern_from_hits() {
        let pattern = DrumPattern::from_hits(&[0, 8], &[4, 12], &[], &[15, 99]);
        assert!(pattern.kick[0] && pattern.kick[8]);
        assert!(pattern.snare[4] && pattern.snare[12]);
        assert!(pattern.perc[15]);
        assert_eq!(pattern.density(), 5);
    }

    #[test]
    fn test_progression_cycles_by_bar() {
        let progression = ChordProgression {
            chords: vec![vec![0, 4, 7], vec![5, 9, 12]],
        };
        assert_eq!(progression.chord_for_bar(0), &[0, 4, 7]);
        assert_eq!(progression.chord_for_bar(3), &[5, 9, 12]);
        assert_eq!(progression.root_for_bar(2), 0);
    }
}
