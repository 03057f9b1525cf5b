// Beatsmith - Procedural beat generator and step-sequencer scheduler
// Module declarations

pub mod commands;
pub mod config;
pub mod events;
pub mod generator;
pub mod groove;
pub mod playback;
pub mod sequencer;
pub mod state;
pub mod styles;

pub use config::EngineConfig;
pub use generator::{generate, GenerateOverrides, GeneratedPattern};
pub use sequencer::{Sequencer, Transport};
pub use styles::Style;
