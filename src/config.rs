// Engine Configuration - Tunables for generation, playback and caching
// Every section has defaults; a JSON file may override any subset

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub generator: GeneratorConfig,
    pub sequencer: SequencerConfig,
    pub cache: CacheConfig,
}

impl EngineConfig {
    /// Load a config file; missing fields keep their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&contents)?;
        Ok(config.sanitized())
    }

    /// Clamp every field into its supported range
    pub fn sanitized(self) -> Self {
        EngineConfig {
            generator: self.generator.sanitized(),
            sequencer: self.sequencer.sanitized(),
            cache: self.cache,
        }
    }
}

/// Pattern assembler tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// BPM jitter band (+/-) applied when no tempo override is given
    pub bpm_jitter: i32,

    /// Inversion is chosen when the RNG draw exceeds this threshold
    pub chord_inversion_threshold: f64,

    /// Chance of an extra octave on a melody note
    pub melody_octave_jump_chance: f64,

    /// Chance per bar that the bass pattern is sampled one step late
    pub bass_jitter_chance: f64,

    /// Bass note length in steps
    pub bass_duration: u32,

    /// Highest rotation applied to hihat and perc lanes
    pub max_rotation: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            bpm_jitter: 3,
            chord_inversion_threshold: 0.6,
            melody_octave_jump_chance: 0.1,
            bass_jitter_chance: 0.25,
            bass_duration: 2,
            max_rotation: 3,
        }
    }
}

impl GeneratorConfig {
    pub fn sanitized(self) -> Self {
        GeneratorConfig {
            bpm_jitter: self.bpm_jitter.clamp(0, 20),
            chord_inversion_threshold: self.chord_inversion_threshold.clamp(0.0, 1.0),
            melody_octave_jump_chance: self.melody_octave_jump_chance.clamp(0.0, 1.0),
            bass_jitter_chance: self.bass_jitter_chance.clamp(0.0, 1.0),
            bass_duration: self.bass_duration.clamp(1, 16),
            max_rotation: self.max_rotation.clamp(0, 15),
        }
    }
}

/// Step sequencer tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Undo snapshots kept before the oldest is evicted
    pub history_capacity: usize,

    /// Delay of the flam ghost note in milliseconds
    pub flam_delay_ms: u64,

    /// Flam velocity relative to the primary hit
    pub flam_velocity_ratio: f64,

    /// Each roll repeat keeps this fraction of the previous velocity
    pub roll_decay: f64,

    /// Seed for probability, randomize and humanize draws; clock-derived when absent
    pub seed: Option<u64>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        SequencerConfig {
            history_capacity: 30,
            flam_delay_ms: 30,
            flam_velocity_ratio: 0.6,
            roll_decay: 0.9,
            seed: None,
        }
    }
}

impl SequencerConfig {
    pub fn sanitized(self) -> Self {
        SequencerConfig {
            history_capacity: self.history_capacity.clamp(1, 1000),
            flam_delay_ms: self.flam_delay_ms.min(500),
            flam_velocity_ratio: self.flam_velocity_ratio.clamp(0.0, 1.0),
            roll_decay: self.roll_decay.clamp(0.0, 1.0),
            seed: self.seed,
        }
    }
}

/// Pattern cache tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: 64,
            ttl_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.sequencer.history_capacity, 30);
        assert_eq!(config.generator.bpm_jitter, 3);
        assert_eq!(config.cache.capacity, 64);
    }

    #[test]
    fn test_load_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "sequencer": { "history_capacity": 5 } }"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.sequencer.history_capacity, 5);
        assert_eq!(config.sequencer.flam_delay_ms, 30);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_load_clamps_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "generator": { "chord_inversion_threshold": 4.0 }, "sequencer": { "history_capacity": 0 } }"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.generator.chord_inversion_threshold, 1.0);
        assert_eq!(config.sequencer.history_capacity, 1);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(EngineConfig::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load(Path::new("/nonexistent/beatsmith.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
