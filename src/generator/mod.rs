// Generator - Deterministic procedural pattern generation
// Seeded RNG, transform math, assembly, caching and MIDI export

pub mod assembler;
pub mod cache;
pub mod midi;
pub mod pattern;
pub mod rng;
pub mod transform;

// Re-export main types
pub use assembler::{default_seed, generate, generate_with};
pub use cache::PatternCache;
pub use midi::{export_midi, MidiError, MidiExportOptions};
pub use pattern::{ChordEvent, DrumEvent, GenerateOverrides, GeneratedPattern, NoteEvent};
pub use rng::{clock_seed, SeededRng};
pub use transform::{clamp_midi, degree_to_midi, rotate, voice_chord};
