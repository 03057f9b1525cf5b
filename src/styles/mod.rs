// Styles Module
// Closed catalog of musical styles for fallback generation

pub mod templates;
pub mod types;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::groove::grid::STEPS_PER_BAR;

pub use templates::MELODY_TEMPLATES;
pub use types::{
    key_name, midi_to_note_name, parse_key, BassPatternId, ChordProgression, ChordProgressionId,
    DegreePattern, DrumLaneKind, DrumPattern, DrumPatternId, Scale, StyleConfig, StyleSummary,
    REST,
};

/// Every style the catalog knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    LofiChill,
    Trap,
    House,
    BoomBap,
    DrumAndBass,
    Ambient,
}

impl Style {
    /// Substituted for unknown style names
    pub const DEFAULT: Style = Style::LofiChill;

    pub const ALL: [Style; 6] = [
        Style::LofiChill,
        Style::Trap,
        Style::House,
        Style::BoomBap,
        Style::DrumAndBass,
        Style::Ambient,
    ];

    /// Resolve a display name, ignoring case, punctuation and a trailing "style"
    pub fn from_name(name: &str) -> Option<Style> {
        let normalized = normalize_name(name);
        Style::ALL
            .iter()
            .copied()
            .find(|style| normalize_name(style.display_name()) == normalized)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Style::LofiChill => "Lo-fi chill",
            Style::Trap => "Trap-style",
            Style::House => "House",
            Style::BoomBap => "Boom bap",
            Style::DrumAndBass => "Drum and bass",
            Style::Ambient => "Ambient",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Style::LofiChill => "Dusty swung drums, jazzy minor sevenths, lazy bass.",
            Style::Trap => "Halftime snare, rattling hats, sliding 808 bass.",
            Style::House => "Four on the floor with pumping offbeat bass.",
            Style::BoomBap => "Classic hip-hop kick/snare with a walking bass.",
            Style::DrumAndBass => "Fast broken beats over rolling bass.",
            Style::Ambient => "Sparse pulses and suspended chords.",
        }
    }

    /// Get the configuration for this style
    pub fn config(&self) -> StyleConfig {
        let (bpm, key, scale, drum_pattern, bass_pattern, chord_progression) = match self {
            Style::LofiChill => (
                80,
                9, // A
                Scale::Minor,
                DrumPatternId::LofiSwing,
                BassPatternId::LazyRoots,
                ChordProgressionId::JazzyMinor,
            ),
            Style::Trap => (
                140,
                1, // C#
                Scale::Minor,
                DrumPatternId::TrapHalftime,
                BassPatternId::SlidingEights,
                ChordProgressionId::DarkMinor,
            ),
            Style::House => (
                124,
                5, // F
                Scale::Minor,
                DrumPatternId::FourOnFloor,
                BassPatternId::OffbeatPump,
                ChordProgressionId::SoulMinor,
            ),
            Style::BoomBap => (
                90,
                2, // D
                Scale::Minor,
                DrumPatternId::BoomBap,
                BassPatternId::Walking,
                ChordProgressionId::JazzyMinor,
            ),
            Style::DrumAndBass => (
                174,
                4, // E
                Scale::Minor,
                DrumPatternId::Breakbeat,
                BassPatternId::Rolling,
                ChordProgressionId::Epic,
            ),
            Style::Ambient => (
                70,
                0, // C
                Scale::Major,
                DrumPatternId::Sparse,
                BassPatternId::Drone,
                ChordProgressionId::Suspended,
            ),
        };

        StyleConfig {
            name: self.display_name(),
            bpm,
            key,
            scale,
            drum_pattern,
            bass_pattern,
            chord_progression,
        }
    }

    /// Get a summary of this style for listings
    pub fn summary(&self) -> StyleSummary {
        let config = self.config();
        StyleSummary {
            name: config.name.to_string(),
            description: self.description().to_string(),
            bpm: config.bpm,
            key: config.key_name().to_string(),
            scale: config.scale,
        }
    }
}

fn normalize_name(name: &str) -> String {
    let mut normalized: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if normalized.len() > "style".len() && normalized.ends_with("style") {
        normalized.truncate(normalized.len() - "style".len());
    }
    normalized
}

/// Resolve a style name, substituting the default for unknown names
///
/// Returns the style plus a warning when the substitution happened.
pub fn resolve_style(name: &str) -> (Style, Option<String>) {
    match Style::from_name(name) {
        Some(style) => (style, None),
        None => {
            let warning = format!(
                "unknown style '{}' substituted with '{}'",
                name,
                Style::DEFAULT.display_name()
            );
            log::warn!("{}", warning);
            (Style::DEFAULT, Some(warning))
        }
    }
}

/// List all available styles with summaries
pub fn list_styles() -> Vec<StyleSummary> {
    Style::ALL.iter().map(|s| s.summary()).collect()
}

/// Get all style names
pub fn list_style_names() -> Vec<String> {
    Style::ALL.iter().map(|s| s.display_name().to_string()).collect()
}

/// Catalog shape violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("scale {0} must have 7 degrees starting at 0")]
    BadScale(&'static str),
    #[error("style '{0}' has no chords")]
    EmptyProgression(&'static str),
    #[error("style '{0}' uses degree {1} below the rest sentinel")]
    BadDegree(&'static str, i8),
    #[error("style '{0}' has an empty drum template")]
    EmptyDrums(&'static str),
}

/// Check every style resolves to well-formed templates
pub fn validate_catalog() -> Result<(), CatalogError> {
    for style in Style::ALL {
        let config = style.config();

        let intervals = config.scale.intervals();
        if intervals.len() != 7 || intervals[0] != 0 {
            return Err(CatalogError::BadScale(config.scale.name()));
        }

        if config.chord_progression.progression().chords.is_empty() {
            return Err(CatalogError::EmptyProgression(config.name));
        }

        let bass = config.bass_pattern.degrees();
        debug_assert_eq!(bass.len(), STEPS_PER_BAR);
        if let Some(&bad) = bass.iter().find(|&&d| d < REST) {
            return Err(CatalogError::BadDegree(config.name, bad));
        }

        if config.drum_pattern.pattern().density() == 0 {
            return Err(CatalogError::EmptyDrums(config.name));
        }
    }

    for melody in MELODY_TEMPLATES.iter() {
        if let Some(&bad) = melody.iter().find(|&&d| d < REST) {
            return Err(CatalogError::BadDegree("melody", bad));
        }
    }

    Ok(())
}
