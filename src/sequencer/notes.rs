// Note Lanes - Pitched parts played alongside the drum grid
// Loaded from the bass, chord and melody parts of a generated pattern

use serde::{Deserialize, Serialize};

use crate::generator::GeneratedPattern;

/// A pitched note at a sequencer step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedNote {
    pub step: usize,
    /// MIDI note number
    pub note: u8,
    /// Length in steps
    pub duration: u32,
    pub velocity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteLane {
    pub name: String,
    pub instrument: String,
    /// 0-100
    pub volume: u8,
    pub muted: bool,
    pub notes: Vec<SequencedNote>,
}

impl NoteLane {
    pub fn new(name: impl Into<String>, instrument: impl Into<String>) -> Self {
        NoteLane {
            name: name.into(),
            instrument: instrument.into(),
            volume: 80,
            muted: false,
            notes: Vec::new(),
        }
    }

    /// Notes that start on `step`
    pub fn notes_at(&self, step: usize) -> impl Iterator<Item = &SequencedNote> + '_ {
        self.notes.iter().filter(move |n| n.step == step)
    }
}

const LANE_VELOCITY: u8 = 100;

/// Bass, chord and melody lanes for a generated pattern; chords expand to one note per tone
pub fn lanes_from_pattern(pattern: &GeneratedPattern) -> Vec<NoteLane> {
    let mut bass = NoteLane::new("Bass", "bass");
    bass.notes = pattern
        .bass
        .iter()
        .map(|e| SequencedNote {
            step: e.step,
            note: e.note,
            duration: e.duration,
            velocity: LANE_VELOCITY,
        })
        .collect();

    let mut chords = NoteLane::new("Chords", "keys");
    chords.volume = 60;
    chords.notes = pattern
        .chords
        .iter()
        .flat_map(|chord| {
            chord.notes.iter().map(move |&note| SequencedNote {
                step: chord.step,
                note,
                duration: chord.duration,
                velocity: LANE_VELOCITY,
            })
        })
        .collect();

    let mut melody = NoteLane::new("Melody", "lead");
    melody.notes = pattern
        .melody
        .iter()
        .map(|e| SequencedNote {
            step: e.step,
            note: e.note,
            duration: e.duration,
            velocity: LANE_VELOCITY,
        })
        .collect();

    vec![bass, chords, melody]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, GenerateOverrides};

    #[test]
    fn test_lanes_from_pattern() {
        let pattern = generate("House", &GenerateOverrides::with_seed(11));
        let lanes = lanes_from_pattern(&pattern);

        assert_eq!(lanes.len(), 3);
        assert_eq!(lanes[0].notes.len(), pattern.bass.len());

        let chord_tones: usize = pattern.chords.iter().map(|c| c.notes.len()).sum();
        assert_eq!(lanes[1].notes.len(), chord_tones);
        assert_eq!(lanes[2].notes.len(), pattern.melody.len());
    }

    #[test]
    fn test_notes_at() {
        let mut lane = NoteLane::new("Bass", "bass");
        lane.notes.push(SequencedNote { step: 0, note: 45, duration: 2, velocity: 100 });
        lane.notes.push(SequencedNote { step: 4, note: 48, duration: 2, velocity: 100 });

        assert_eq!(lane.notes_at(4).count(), 1);
        assert_eq!(lane.notes_at(1).count(), 0);
    }
}
