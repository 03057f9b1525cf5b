// State management module
// JSON persistence for kits and patterns, plus hashed export artifacts

pub mod storage;

pub use storage::{
    calculate_sha256, default_data_dir, load_pattern, load_tracks, save_pattern, save_tracks,
    store_artifact, subdir, KitFile, StorageError, StorageResult,
};
