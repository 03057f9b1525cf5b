// Sequencer module
// Step grid, edit history, presets, tick evaluation and the real-time transport

pub mod history;
pub mod notes;
pub mod presets;
pub mod scheduler;
pub mod track;
pub mod transport;

pub use history::History;
pub use notes::{lanes_from_pattern, NoteLane, SequencedNote};
pub use presets::Preset;
pub use scheduler::{
    DeferredHit, SchedulerState, Sequencer, SequencerError, SequencerResult, TickOutcome,
};
pub use track::{default_kit, DrumStep, DrumTrack, PatternLength, StepPatch};
pub use transport::{next_deadline, SharedSequencer, Transport};
