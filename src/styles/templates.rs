// Pattern Templates - One-bar drum, bass, chord and melody material
// Every id in types.rs resolves here; validate_catalog checks the shapes

use super::types::{
    BassPatternId, ChordProgression, ChordProgressionId, DegreePattern, DrumPattern,
    DrumPatternId, REST,
};

const R: i8 = REST;

impl DrumPatternId {
    pub const ALL: [DrumPatternId; 6] = [
        DrumPatternId::LofiSwing,
        DrumPatternId::TrapHalftime,
        DrumPatternId::FourOnFloor,
        DrumPatternId::BoomBap,
        DrumPatternId::Breakbeat,
        DrumPatternId::Sparse,
    ];

    /// Get the one-bar template for this id
    pub fn pattern(&self) -> DrumPattern {
        match self {
            DrumPatternId::LofiSwing => DrumPattern::from_hits(
                &[0, 7, 10],
                &[4, 12],
                &[0, 2, 4, 6, 8, 10, 12, 14],
                &[15],
            ),
            DrumPatternId::TrapHalftime => DrumPattern::from_hits(
                &[0, 3, 7, 11],
                &[8],
                &[0, 1, 2, 3, 4, 6, 8, 9, 10, 11, 12, 14, 15],
                &[12],
            ),
            DrumPatternId::FourOnFloor => DrumPattern::from_hits(
                &[0, 4, 8, 12],
                &[4, 12],
                &[2, 6, 10, 14],
                &[7, 15],
            ),
            DrumPatternId::BoomBap => DrumPattern::from_hits(
                &[0, 3, 8, 10],
                &[4, 12],
                &[0, 2, 4, 6, 8, 10, 12, 14],
                &[6],
            ),
            DrumPatternId::Breakbeat => DrumPattern::from_hits(
                &[0, 6, 10],
                &[4, 12, 14],
                &[0, 2, 4, 6, 8, 10, 12, 14],
                &[3, 11],
            ),
            DrumPatternId::Sparse => DrumPattern::from_hits(
                &[0],
                &[8],
                &[4, 12],
                &[14],
            ),
        }
    }
}

impl BassPatternId {
    pub const ALL: [BassPatternId; 6] = [
        BassPatternId::LazyRoots,
        BassPatternId::SlidingEights,
        BassPatternId::OffbeatPump,
        BassPatternId::Walking,
        BassPatternId::Rolling,
        BassPatternId::Drone,
    ];

    /// Get the degree pattern for this id
    pub fn degrees(&self) -> DegreePattern {
        match self {
            BassPatternId::LazyRoots => [0, R, R, R, R, R, R, 0, R, R, 4, R, R, R, R, R],
            BassPatternId::SlidingEights => [0, R, R, 0, R, R, R, 0, R, R, R, 7, R, R, 6, R],
            BassPatternId::OffbeatPump => [R, R, 0, R, R, R, 0, R, R, R, 0, R, R, R, 0, R],
            BassPatternId::Walking => [0, R, R, R, 2, R, R, R, 4, R, R, R, 5, R, R, R],
            BassPatternId::Rolling => [0, R, 0, 0, R, R, 0, R, 0, R, 0, 0, R, 4, R, R],
            BassPatternId::Drone => [0, R, R, R, R, R, R, R, R, R, R, R, R, R, R, R],
        }
    }
}

impl ChordProgressionId {
    pub const ALL: [ChordProgressionId; 6] = [
        ChordProgressionId::JazzyMinor,
        ChordProgressionId::DarkMinor,
        ChordProgressionId::PopMajor,
        ChordProgressionId::SoulMinor,
        ChordProgressionId::Epic,
        ChordProgressionId::Suspended,
    ];

    /// Get the interval sets for this progression
    pub fn progression(&self) -> ChordProgression {
        let chords: Vec<Vec<i32>> = match self {
            // i7 - iv7 - VImaj7 - v7
            ChordProgressionId::JazzyMinor => vec![
                vec![0, 3, 7, 10],
                vec![5, 8, 12, 15],
                vec![8, 12, 15, 19],
                vec![7, 10, 14, 17],
            ],
            // i - VI - III - VII
            ChordProgressionId::DarkMinor => vec![
                vec![0, 3, 7],
                vec![8, 12, 15],
                vec![3, 7, 10],
                vec![10, 14, 17],
            ],
            // I - V - vi - IV
            ChordProgressionId::PopMajor => vec![
                vec![0, 4, 7],
                vec![7, 11, 14],
                vec![9, 12, 16],
                vec![5, 9, 12],
            ],
            // i9 - iv9
            ChordProgressionId::SoulMinor => vec![
                vec![0, 3, 7, 14],
                vec![5, 8, 12, 19],
            ],
            // i - VII - VI - VII
            ChordProgressionId::Epic => vec![
                vec![0, 3, 7],
                vec![10, 14, 17],
                vec![8, 12, 15],
                vec![10, 14, 17],
            ],
            // Isus2 - IVsus2
            ChordProgressionId::Suspended => vec![
                vec![0, 2, 7],
                vec![5, 7, 12],
            ],
        };

        ChordProgression { chords }
    }
}

/// Melody templates shared by all styles; the assembler picks one per generation
pub const MELODY_TEMPLATES: [DegreePattern; 4] = [
    [4, R, R, 2, R, R, 0, R, R, R, 2, R, 4, R, R, R],
    [0, R, 2, R, 4, R, R, R, 7, R, 6, R, 4, R, R, R],
    [R, R, 4, R, R, 5, R, 4, R, R, 2, R, R, 0, R, R],
    [7, R, R, R, 4, R, R, R, 5, R, 4, R, 2, R, R, R],
];
