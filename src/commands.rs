// Collaborator Commands
// Serializable request/response surface over generation, export and the sequencer
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::generator::{
    clock_seed, export_midi, GenerateOverrides, GeneratedPattern, MidiExportOptions, PatternCache,
};
use crate::sequencer::{SchedulerState, Sequencer, StepPatch};
use crate::state;
use crate::styles::{self, StyleSummary};

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

// ==================== STYLE COMMANDS ====================

/// List all styles with summaries
pub fn list_styles() -> CommandResult<Vec<StyleSummary>> {
    Ok(styles::list_styles())
}

// ==================== GENERATION COMMANDS ====================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratePatternInput {
    pub style: String,
    pub tempo: Option<f64>,
    pub time_signature: Option<String>,
    pub key: Option<String>,
    pub seed: Option<u64>,
    /// Draw a clock seed when no explicit seed is given
    pub fresh_seed: bool,
    pub fallback_reason: Option<String>,
}

/// A seed that differs between calls
pub fn fresh_seed() -> u64 {
    clock_seed()
}

/// Generate (or fetch from cache) a pattern
pub fn generate_pattern(
    cache: &mut PatternCache,
    input: GeneratePatternInput,
) -> CommandResult<Arc<GeneratedPattern>> {
    let seed = input
        .seed
        .or_else(|| input.fresh_seed.then(fresh_seed));

    let overrides = GenerateOverrides {
        tempo: input.tempo,
        time_signature: input.time_signature,
        key: input.key,
        random_seed: seed,
        fallback_reason: input.fallback_reason,
    };

    let pattern = cache.get_or_generate(&input.style, &overrides);
    log::info!(
        "Generated {} pattern: {} drums, {} bass, {} chords, {} melody",
        pattern.style,
        pattern.drums.len(),
        pattern.bass.len(),
        pattern.chords.len(),
        pattern.melody.len()
    );
    Ok(pattern)
}

// ==================== EXPORT COMMANDS ====================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMidiInput {
    pub pattern: GeneratedPattern,
    pub ppq: Option<u16>,
    pub include_tempo: Option<bool>,
    pub include_time_signature: Option<bool>,
    pub track_names: Option<bool>,
    pub velocity: Option<u8>,
}

impl ExportMidiInput {
    pub fn new(pattern: GeneratedPattern) -> Self {
        ExportMidiInput {
            pattern,
            ppq: None,
            include_tempo: None,
            include_time_signature: None,
            track_names: None,
            velocity: None,
        }
    }

    fn options(&self) -> MidiExportOptions {
        let mut options = MidiExportOptions::default();
        if let Some(ppq) = self.ppq {
            options.ppq = ppq;
        }
        if let Some(include_tempo) = self.include_tempo {
            options.include_tempo = include_tempo;
        }
        if let Some(include_time_signature) = self.include_time_signature {
            options.include_time_signature = include_time_signature;
        }
        if let Some(track_names) = self.track_names {
            options.track_names = track_names;
        }
        if let Some(velocity) = self.velocity {
            options.velocity = velocity;
        }
        options
    }
}

/// Export a pattern as Standard MIDI File bytes
pub fn export_pattern_midi(input: &ExportMidiInput) -> CommandResult<Vec<u8>> {
    let midi_bytes = export_midi(&input.pattern, &input.options()).map_err(|e| CommandError {
        message: format!("Failed to export MIDI: {}", e),
    })?;
    Ok(midi_bytes)
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub sha256: String,
    pub bytes: usize,
}

/// Export to `dir/filename` and report the stored file
pub fn export_pattern_midi_to(
    dir: &Path,
    filename: &str,
    input: &ExportMidiInput,
) -> CommandResult<ExportedFile> {
    let midi_bytes = export_pattern_midi(input)?;
    let (path, sha256) = state::store_artifact(dir, filename, &midi_bytes)?;
    log::info!("Exported MIDI to {} ({} bytes)", path.display(), midi_bytes.len());
    Ok(ExportedFile {
        path,
        sha256,
        bytes: midi_bytes.len(),
    })
}

// ==================== SEQUENCER COMMANDS ====================

/// Copy a generated pattern into the sequencer
pub fn load_pattern(
    sequencer: &mut Sequencer,
    pattern: &GeneratedPattern,
) -> CommandResult<SchedulerState> {
    sequencer.load_generated(pattern);
    Ok(sequencer.state().clone())
}

/// One sequencer operation, as sent by a UI
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SequencerCommand {
    Play,
    Pause,
    Stop,
    SetTempo { bpm: f64 },
    SetPatternLength { steps: usize },
    SetSwing { percent: f64 },
    SetGroove { percent: f64 },
    ToggleStep { track: usize, step: usize },
    SetStepParam { track: usize, step: usize, patch: StepPatch },
    Randomize,
    Clear,
    LoadPreset { name: String },
    CopyTrackPattern { track: usize },
    PasteTrackPattern { track: usize },
    Humanize { amount: f64 },
    Undo,
    Redo,
    SetTrackVolume { track: usize, volume: u8 },
    SetTrackPan { track: usize, pan: i8 },
    ToggleMute { track: usize },
    ToggleSolo { track: usize },
}

/// Apply a command and return the resulting scheduler state
pub fn apply_sequencer_command(
    sequencer: &mut Sequencer,
    command: SequencerCommand,
) -> CommandResult<SchedulerState> {
    match command {
        SequencerCommand::Play => sequencer.play(),
        SequencerCommand::Pause => sequencer.pause(),
        SequencerCommand::Stop => sequencer.stop(),
        SequencerCommand::SetTempo { bpm } => {
            sequencer.set_tempo(bpm);
        }
        SequencerCommand::SetPatternLength { steps } => sequencer.set_pattern_length(steps)?,
        SequencerCommand::SetSwing { percent } => {
            sequencer.set_swing(percent);
        }
        SequencerCommand::SetGroove { percent } => {
            sequencer.set_groove(percent);
        }
        SequencerCommand::ToggleStep { track, step } => {
            sequencer.toggle_step(track, step)?;
        }
        SequencerCommand::SetStepParam { track, step, patch } => {
            sequencer.set_step_param(track, step, patch)?;
        }
        SequencerCommand::Randomize => sequencer.randomize(),
        SequencerCommand::Clear => sequencer.clear(),
        SequencerCommand::LoadPreset { name } => {
            sequencer.load_preset(&name)?;
        }
        SequencerCommand::CopyTrackPattern { track } => sequencer.copy_track_pattern(track)?,
        SequencerCommand::PasteTrackPattern { track } => {
            sequencer.paste_track_pattern(track)?;
        }
        SequencerCommand::Humanize { amount } => {
            sequencer.humanize(amount);
        }
        SequencerCommand::Undo => {
            sequencer.undo();
        }
        SequencerCommand::Redo => {
            sequencer.redo();
        }
        SequencerCommand::SetTrackVolume { track, volume } => {
            sequencer.set_track_volume(track, volume)?;
        }
        SequencerCommand::SetTrackPan { track, pan } => {
            sequencer.set_track_pan(track, pan)?;
        }
        SequencerCommand::ToggleMute { track } => {
            sequencer.toggle_mute(track)?;
        }
        SequencerCommand::ToggleSolo { track } => {
            sequencer.toggle_solo(track)?;
        }
    }
    Ok(sequencer.state().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CacheConfig, GeneratorConfig, SequencerConfig};
    use crate::playback::NullSink;
    use tempfile::TempDir;

    fn cache() -> PatternCache {
        PatternCache::new(&CacheConfig::default(), GeneratorConfig::default())
    }

    fn sequencer() -> Sequencer {
        let config = SequencerConfig {
            seed: Some(9),
            ..SequencerConfig::default()
        };
        Sequencer::new(config, Box::new(NullSink))
    }

    #[test]
    fn test_generate_pattern_with_seed_is_cached() {
        let mut cache = cache();
        let input = GeneratePatternInput {
            style: "Trap-style".to_string(),
            seed: Some(7),
            ..GeneratePatternInput::default()
        };

        let first = generate_pattern(&mut cache, input.clone()).unwrap();
        let second = generate_pattern(&mut cache, input).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.seed, 7);
    }

    #[test]
    fn test_generate_input_from_json() {
        let input: GeneratePatternInput =
            serde_json::from_str(r#"{"style":"House","tempo":128,"freshSeed":true}"#).unwrap();
        assert_eq!(input.style, "House");
        assert_eq!(input.tempo, Some(128.0));
        assert!(input.fresh_seed);
        assert!(input.seed.is_none());
    }

    #[test]
    fn test_export_rejects_zero_ppq() {
        let mut cache = cache();
        let pattern = generate_pattern(
            &mut cache,
            GeneratePatternInput {
                style: "House".to_string(),
                seed: Some(1),
                ..GeneratePatternInput::default()
            },
        )
        .unwrap();

        let mut input = ExportMidiInput::new((*pattern).clone());
        assert!(export_pattern_midi(&input).unwrap().starts_with(b"MThd"));

        input.ppq = Some(0);
        let error = export_pattern_midi(&input).unwrap_err();
        assert!(error.message().starts_with("Failed to export MIDI"));
    }

    #[test]
    fn test_export_to_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = cache();
        let pattern = generate_pattern(
            &mut cache,
            GeneratePatternInput {
                style: "Ambient".to_string(),
                seed: Some(2),
                ..GeneratePatternInput::default()
            },
        )
        .unwrap();

        let exported =
            export_pattern_midi_to(temp_dir.path(), "ambient.mid", &ExportMidiInput::new((*pattern).clone()))
                .unwrap();
        assert!(exported.path.exists());
        assert_eq!(exported.sha256.len(), 64);
        assert!(exported.bytes > 0);
    }

    #[test]
    fn test_load_pattern() {
        let mut seq = sequencer();
        let pattern = crate::generator::generate("Boom bap", &GenerateOverrides::with_seed(3));
        let state = load_pattern(&mut seq, &pattern).unwrap();
        assert_eq!(state.pattern_length.steps(), 64);
        assert_eq!(state.bpm, pattern.bpm);
    }

    #[test]
    fn test_sequencer_commands_from_json() {
        let mut seq = sequencer();
        let commands = [
            r#"{"command":"toggle_step","track":0,"step":0}"#,
            r#"{"command":"set_step_param","track":0,"step":0,"patch":{"velocity":64}}"#,
            r#"{"command":"set_swing","percent":55}"#,
            r#"{"command":"play"}"#,
        ];
        for json in commands {
            let command: SequencerCommand = serde_json::from_str(json).unwrap();
            apply_sequencer_command(&mut seq, command).unwrap();
        }

        let state = seq.state();
        assert!(state.is_playing());
        assert_eq!(state.swing, 55.0);
        assert_eq!(seq.tracks()[0].pattern[0].velocity, 64);
        assert!(seq.tracks()[0].pattern[0].active);
    }

    #[test]
    fn test_sequencer_errors_become_messages() {
        let mut seq = sequencer();
        let error = apply_sequencer_command(
            &mut seq,
            SequencerCommand::LoadPreset {
                name: "polka".to_string(),
            },
        )
        .unwrap_err();
        assert_eq!(error.message(), "Unknown preset: polka");

        let error =
            apply_sequencer_command(&mut seq, SequencerCommand::SetPatternLength { steps: 7 })
                .unwrap_err();
        assert!(error.message().contains("7"));
    }
}
