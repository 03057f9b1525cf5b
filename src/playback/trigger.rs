// Playback Triggers - Boundary between the sequencer and an external sound engine
// The sequencer only emits timed trigger calls; synthesis lives elsewhere

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors a sound engine may report for a single trigger
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Sound engine unavailable: {0}")]
    Unavailable(String),
}

/// A percussion hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercussionTrigger {
    pub instrument: String,
    /// MIDI velocity (0-127)
    pub velocity: u8,
    /// Track volume (0-100)
    pub track_volume: u8,
    /// Stereo position (-100 left .. 100 right)
    pub pan: i8,
    /// Semitone offset (-12..12)
    pub pitch: i8,
}

/// A pitched note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchedTrigger {
    /// Pitch name such as "C#"
    pub note: String,
    pub octave: i8,
    pub duration_secs: f64,
    pub instrument: String,
    /// Normalized velocity (0.0-1.0)
    pub velocity: f32,
}

/// Sound engine capability consumed by the sequencer
pub trait TriggerSink: Send {
    fn trigger_percussion(&mut self, hit: &PercussionTrigger) -> Result<(), TriggerError>;

    fn trigger_pitched(&mut self, note: &PitchedTrigger) -> Result<(), TriggerError>;
}

/// Either kind of trigger, as delivered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    Percussion(PercussionTrigger),
    Pitched(PitchedTrigger),
}

/// Deliver a trigger, containing any failure
///
/// Errors and panics from the sink are logged and reported as `false`;
/// they never propagate into the caller's tick.
pub fn deliver(sink: &mut dyn TriggerSink, trigger: &Trigger) -> bool {
    let result = panic::catch_unwind(AssertUnwindSafe(|| match trigger {
        Trigger::Percussion(hit) => sink.trigger_percussion(hit),
        Trigger::Pitched(note) => sink.trigger_pitched(note),
    }));

    match result {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::warn!("Trigger failed: {}", e);
            false
        }
        Err(_) => {
            log::error!("Sound engine panicked while handling {:?}", trigger);
            false
        }
    }
}

/// Discards every trigger
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TriggerSink for NullSink {
    fn trigger_percussion(&mut self, _hit: &PercussionTrigger) -> Result<(), TriggerError> {
        Ok(())
    }

    fn trigger_pitched(&mut self, _note: &PitchedTrigger) -> Result<(), TriggerError> {
        Ok(())
    }
}

/// Writes every trigger to the log (dry-run playback)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TriggerSink for LogSink {
    fn trigger_percussion(&mut self, hit: &PercussionTrigger) -> Result<(), TriggerError> {
        log::info!(
            "♪ {:<10} vel {:>3} vol {:>3}",
            hit.instrument,
            hit.velocity,
            hit.track_volume
        );
        Ok(())
    }

    fn trigger_pitched(&mut self, note: &PitchedTrigger) -> Result<(), TriggerError> {
        log::info!(
            "♫ {:<10} {}{} {:.3}s vel {:.2}",
            note.instrument,
            note.note,
            note.octave,
            note.duration_secs,
            note.velocity
        );
        Ok(())
    }
}

/// Records triggers into a shared buffer
///
/// Clones share the buffer, so a test can keep one handle while the
/// sequencer owns the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    triggers: Arc<Mutex<Vec<Trigger>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn triggers(&self) -> Vec<Trigger> {
        self.triggers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Recorded percussion hits only
    pub fn percussion(&self) -> Vec<PercussionTrigger> {
        self.triggers()
            .into_iter()
            .filter_map(|t| match t {
                Trigger::Percussion(hit) => Some(hit),
                Trigger::Pitched(_) => None,
            })
            .collect()
    }

    /// Recorded pitched notes only
    pub fn pitched(&self) -> Vec<PitchedTrigger> {
        self.triggers()
            .into_iter()
            .filter_map(|t| match t {
                Trigger::Pitched(note) => Some(note),
                Trigger::Percussion(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.triggers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn push(&self, trigger: Trigger) {
        self.triggers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(trigger);
    }
}

impl TriggerSink for RecordingSink {
    fn trigger_percussion(&mut self, hit: &PercussionTrigger) -> Result<(), TriggerError> {
        self.push(Trigger::Percussion(hit.clone()));
        Ok(())
    }

    fn trigger_pitched(&mut self, note: &PitchedTrigger) -> Result<(), TriggerError> {
        self.push(Trigger::Pitched(note.clone()));
        Ok(())
    }
}
