// Groove Engine - Grid, swing and accent math
// Shared by the pattern generator and the step sequencer

pub mod feel;
pub mod grid;

pub use feel::{groove_velocity, is_backbeat, swing_interval};
pub use grid::{clamp_bpm, step_duration_secs, TimeSignature, GENERATED_STEPS, STEPS_PER_BAR};
