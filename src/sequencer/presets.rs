// Drum Presets - Named one-bar grooves for the default kit
// Each preset lists hit positions per instrument; positions repeat every 16 steps

use serde::{Deserialize, Serialize};

use super::track::{DrumStep, DrumTrack};
use crate::groove::grid::STEPS_PER_BAR;

/// Closed set of built-in presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Kick on every beat, clap on 2 and 4, off-beat hats
    FourOnTheFloor,
    /// Lazy kick, hard snare on 2 and 4, straight eighth hats
    BoomBap,
    /// Half-time snare with rolling sixteenth hats
    Trap,
    /// Syncopated kick against ghosted snares
    Breakbeat,
    /// Dembow rhythm
    Reggaeton,
}

/// Hits for one instrument in a preset
#[derive(Debug, Clone, Copy)]
pub struct PresetLane {
    pub instrument: &'static str,
    pub steps: &'static [usize],
    /// Accented positions play louder than `base_velocity`
    pub accents: &'static [usize],
    pub base_velocity: u8,
    /// Steps that play a 3-stroke roll
    pub rolls: &'static [usize],
}

const fn lane(instrument: &'static str, steps: &'static [usize]) -> PresetLane {
    PresetLane {
        instrument,
        steps,
        accents: &[],
        base_velocity: 100,
        rolls: &[],
    }
}

const ACCENT_VELOCITY: u8 = 110;
const EIGHTHS: &[usize] = &[0, 2, 4, 6, 8, 10, 12, 14];
const SIXTEENTHS: &[usize] = &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::FourOnTheFloor,
        Preset::BoomBap,
        Preset::Trap,
        Preset::Breakbeat,
        Preset::Reggaeton,
    ];

    /// Match a display or snake_case name, ignoring case and punctuation
    pub fn from_name(name: &str) -> Option<Preset> {
        let wanted: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Preset::ALL.into_iter().find(|preset| {
            let known: String = preset
                .name()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .map(|c| c.to_ascii_lowercase())
                .collect();
            known == wanted
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::FourOnTheFloor => "Four on the floor",
            Preset::BoomBap => "Boom bap",
            Preset::Trap => "Trap",
            Preset::Breakbeat => "Breakbeat",
            Preset::Reggaeton => "Reggaeton",
        }
    }

    pub fn lanes(&self) -> Vec<PresetLane> {
        match self {
            Preset::FourOnTheFloor => vec![
                lane("kick", &[0, 4, 8, 12]),
                lane("clap", &[4, 12]),
                lane("hihat", &[2, 6, 10, 14]),
                PresetLane {
                    base_velocity: 70,
                    ..lane("open_hat", &[14])
                },
            ],
            Preset::BoomBap => vec![
                lane("kick", &[0, 7, 10]),
                lane("snare", &[4, 12]),
                PresetLane {
                    accents: &[0, 4, 8, 12],
                    base_velocity: 75,
                    ..lane("hihat", EIGHTHS)
                },
            ],
            Preset::Trap => vec![
                lane("kick", &[0, 7, 11]),
                lane("snare", &[8]),
                PresetLane {
                    accents: &[0, 4, 8, 12],
                    base_velocity: 80,
                    rolls: &[6, 14],
                    ..lane("hihat", SIXTEENTHS)
                },
            ],
            Preset::Breakbeat => vec![
                lane("kick", &[0, 2, 10]),
                PresetLane {
                    accents: &[4, 12],
                    base_velocity: 60,
                    ..lane("snare", &[4, 7, 9, 12, 15])
                },
                lane("hihat", EIGHTHS),
            ],
            Preset::Reggaeton => vec![
                lane("kick", &[0, 4, 8, 12]),
                lane("snare", &[3, 6, 11, 14]),
                PresetLane {
                    base_velocity: 80,
                    ..lane("hihat", EIGHTHS)
                },
            ],
        }
    }

    /// Replace the grid of every track with this preset
    ///
    /// Tracks whose instrument the preset doesn't use are cleared.
    pub fn apply(&self, tracks: &mut [DrumTrack]) {
        let lanes = self.lanes();
        for track in tracks.iter_mut() {
            track.clear();
            let Some(lane) = lanes.iter().find(|l| l.instrument == track.instrument) else {
                continue;
            };
            for (index, step) in track.pattern.iter_mut().enumerate() {
                let position = index % STEPS_PER_BAR;
                if !lane.steps.contains(&position) {
                    continue;
                }
                let velocity = if lane.accents.contains(&position) {
                    ACCENT_VELOCITY
                } else {
                    lane.base_velocity
                };
                *step = DrumStep::hit(velocity);
                if lane.rolls.contains(&position) {
                    step.roll = 3;
                }
            }
        }
    }
}
