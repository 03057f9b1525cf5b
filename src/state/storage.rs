// File system operations for storing kits, patterns and exported artifacts
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::generator::GeneratedPattern;
use crate::sequencer::DrumTrack;

/// Bumped when the saved kit layout changes
pub const KIT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to get app data directory")]
    NoAppDataDir,
    #[error("Unsupported kit file version {0}")]
    UnsupportedVersion(u32),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Saved drum tracks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KitFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub tracks: Vec<DrumTrack>,
}

/// Get the app data directory
pub fn default_data_dir() -> StorageResult<PathBuf> {
    let data_dir = dirs::data_dir().ok_or(StorageError::NoAppDataDir)?;
    let app_dir = data_dir.join("beatsmith");
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Get (and create) a named subdirectory of `base`
pub fn subdir(base: &Path, name: &str) -> StorageResult<PathBuf> {
    let dir = base.join(name);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Store bytes under `dir` and return the path and SHA256 hash
pub fn store_artifact(dir: &Path, filename: &str, data: &[u8]) -> StorageResult<(PathBuf, String)> {
    fs::create_dir_all(dir)?;
    let file_path = dir.join(filename);
    let mut file = fs::File::create(&file_path)?;
    file.write_all(data)?;

    Ok((file_path, calculate_sha256(data)))
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn save_tracks(path: &Path, tracks: &[DrumTrack]) -> StorageResult<()> {
    let kit = KitFile {
        version: KIT_FORMAT_VERSION,
        saved_at: Utc::now(),
        tracks: tracks.to_vec(),
    };
    let json = serde_json::to_vec_pretty(&kit)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, json)?;
    log::info!("Saved {} tracks to {}", tracks.len(), path.display());
    Ok(())
}

pub fn load_tracks(path: &Path) -> StorageResult<Vec<DrumTrack>> {
    let kit: KitFile = serde_json::from_slice(&fs::read(path)?)?;
    if kit.version != KIT_FORMAT_VERSION {
        return Err(StorageError::UnsupportedVersion(kit.version));
    }
    Ok(kit.tracks)
}

/// Write a generated pattern as pretty JSON; returns path and hash
pub fn save_pattern(
    dir: &Path,
    filename: &str,
    pattern: &GeneratedPattern,
) -> StorageResult<(PathBuf, String)> {
    let json = serde_json::to_vec_pretty(pattern)?;
    store_artifact(dir, filename, &json)
}

pub fn load_pattern(path: &Path) -> StorageResult<GeneratedPattern> {
    Ok(serde_json::from_slice(&fs::read(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate, GenerateOverrides};
    use crate::sequencer::{default_kit, PatternLength};
    use tempfile::TempDir;

    #[test]
    fn test_calculate_sha256() {
        let data = b"hello world";
        let hash = calculate_sha256(data);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_store_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("exports");

        let (path, hash) = store_artifact(&dir, "beat.mid", b"hello world").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello world");
        assert_eq!(hash, calculate_sha256(b"hello world"));
    }

    #[test]
    fn test_tracks_survive_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kits").join("main.json");

        let mut tracks = default_kit(PatternLength::ThirtyTwo);
        tracks[0].pattern[4].active = true;
        tracks[3].volume = 42;

        save_tracks(&path, &tracks).unwrap();
        let loaded = load_tracks(&path).unwrap();
        assert_eq!(loaded, tracks);
    }

    #[test]
    fn test_rejects_unknown_kit_version() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("kit.json");
        let kit = KitFile {
            version: 99,
            saved_at: Utc::now(),
            tracks: Vec::new(),
        };
        fs::write(&path, serde_json::to_vec(&kit).unwrap()).unwrap();

        assert!(matches!(
            load_tracks(&path),
            Err(StorageError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_pattern_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = generate("Boom bap", &GenerateOverrides::with_seed(5));

        let (path, _) = save_pattern(temp_dir.path(), "pattern.json", &pattern).unwrap();
        assert_eq!(load_pattern(&path).unwrap(), pattern);
    }
}
