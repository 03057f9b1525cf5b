// Pattern Assembler - Four bars of drums, bass, chords and melody from a style
// Pure: no I/O and no shared state, safe to call from any thread

use crate::config::GeneratorConfig;
use crate::groove::grid::{clamp_bpm, global_step, TimeSignature, GENERATED_BARS, STEPS_PER_BAR};
use crate::styles::{parse_key, resolve_style, DrumLaneKind, Style, MELODY_TEMPLATES};

use super::pattern::{ChordEvent, DrumEvent, GenerateOverrides, GeneratedPattern, NoteEvent};
use super::rng::SeededRng;
use super::transform::{clamp_midi, degree_to_midi, rotate, voice_chord};

/// MIDI note of the key root's middle octave (C4 = 60)
const ROOT_OCTAVE_BASE: i32 = 60;

/// Chords sustain for the whole bar
const CHORD_DURATION: u32 = STEPS_PER_BAR as u32;

/// Generate a pattern with the default generator settings
pub fn generate(style: &str, overrides: &GenerateOverrides) -> GeneratedPattern {
    generate_with(&GeneratorConfig::default(), style, overrides)
}

/// Generate a pattern for a style name
///
/// Unknown styles, unparseable keys, out-of-range tempos and folded notes are
/// reported in `warnings`; generation itself never fails. The RNG draw order
/// is fixed so the same seed always yields the same pattern:
/// 1. BPM jitter (drawn even when a tempo override is present)
/// 2. Hihat/perc rotation
/// 3. Melody template
/// 4. Per bar: bass offset, chord inversion, then per melody note an octave
///    jump and a duration
pub fn generate_with(
    config: &GeneratorConfig,
    style_name: &str,
    overrides: &GenerateOverrides,
) -> GeneratedPattern {
    let mut warnings = Vec::new();

    let (style, substitution) = resolve_style(style_name);
    warnings.extend(substitution);
    let style_config = style.config();

    let seed = overrides.random_seed.unwrap_or_else(|| default_seed(style));
    let mut rng = SeededRng::new(seed);

    // Tempo
    let jitter = rng.range_i32(-config.bpm_jitter, config.bpm_jitter);
    let bpm = match overrides.tempo {
        Some(tempo) => {
            let clamped = clamp_bpm(tempo);
            if clamped != tempo {
                warnings.push(format!("tempo {} clamped to {}", tempo, clamped));
            }
            clamped
        }
        None => clamp_bpm(style_config.bpm as f64 + jitter as f64),
    };

    // Key
    let (key_pc, key_label) = match overrides.key.as_deref() {
        Some(requested) => match parse_key(requested) {
            Some(pc) => (pc, requested.trim().to_string()),
            None => {
                warnings.push(format!(
                    "unknown key '{}', using '{}'",
                    requested,
                    style_config.key_name()
                ));
                (style_config.key, style_config.key_name().to_string())
            }
        },
        None => (style_config.key, style_config.key_name().to_string()),
    };

    let time_signature = match overrides.time_signature.as_deref() {
        Some(label) => TimeSignature::from_label(label).unwrap_or_else(|| {
            warnings.push(format!("unknown time signature '{}', using 4/4", label));
            TimeSignature::FourFour
        }),
        None => TimeSignature::FourFour,
    };

    // Template selection
    let shift = rng.range_i32(0, config.max_rotation);
    let melody_template = MELODY_TEMPLATES[rng.pick_index(MELODY_TEMPLATES.len())];
    let drum_template = style_config.drum_pattern.pattern();
    let bass_template = style_config.bass_pattern.degrees();
    let progression = style_config.chord_progression.progression();

    let lanes: Vec<(DrumLaneKind, [bool; STEPS_PER_BAR])> = DrumLaneKind::ALL
        .iter()
        .map(|&kind| {
            let lane = drum_template.lane(kind);
            let rotated = if kind.is_anchored() { *lane } else { rotate(lane, shift) };
            (kind, rotated)
        })
        .collect();

    let root = ROOT_OCTAVE_BASE + key_pc as i32;
    let scale = style_config.scale;

    let mut drums = Vec::new();
    let mut bass = Vec::new();
    let mut chords = Vec::with_capacity(GENERATED_BARS);
    let mut melody = Vec::new();
    let mut folded_any = false;

    for bar in 0..GENERATED_BARS {
        let bass_offset = if rng.chance(config.bass_jitter_chance) { 1 } else { 0 };
        let invert = rng.next_f64() > config.chord_inversion_threshold;

        let (notes, folded) = voice_chord(root, progression.chord_for_bar(bar), invert);
        folded_any |= folded;
        chords.push(ChordEvent {
            step: global_step(bar, 0),
            notes,
            duration: CHORD_DURATION,
        });

        let chord_root = progression.root_for_bar(bar);

        for step in 0..STEPS_PER_BAR {
            let at = global_step(bar, step);

            for (kind, lane) in &lanes {
                if lane[step] {
                    drums.push(DrumEvent { step: at, kind: *kind });
                }
            }

            let bass_degree = bass_template[(step + bass_offset) % STEPS_PER_BAR];
            if let Some(midi) = degree_to_midi(root - 12, scale, bass_degree, chord_root) {
                let (note, folded) = clamp_midi(midi);
                folded_any |= folded;
                bass.push(NoteEvent {
                    step: at,
                    note,
                    duration: config.bass_duration,
                });
            }

            if let Some(midi) = degree_to_midi(root + 12, scale, melody_template[step], 0) {
                let jump = if rng.chance(config.melody_octave_jump_chance) { 12 } else { 0 };
                let duration = if rng.next_f64() < 0.5 { 1 } else { 2 };
                let (note, folded) = clamp_midi(midi + jump);
                folded_any |= folded;
                melody.push(NoteEvent { step: at, note, duration });
            }
        }
    }

    if folded_any {
        warnings.push("notes outside the MIDI range were folded by octave".to_string());
    }
    if let Some(reason) = overrides.fallback_reason.as_deref() {
        warnings.push(format!("fallback: {}", reason));
    }

    log::info!(
        "Generated '{}' pattern: seed {}, {:.0} BPM, {} drums, {} bass, {} melody notes",
        style.display_name(),
        seed,
        bpm,
        drums.len(),
        bass.len(),
        melody.len()
    );

    GeneratedPattern {
        style: style.display_name().to_string(),
        bpm,
        key: key_label,
        time_signature,
        drums,
        bass,
        chords,
        melody,
        seed,
        is_fallback: true,
        warnings,
    }
}

/// Seed used when the caller supplies none: FNV-1a of the style name
///
/// Keeps seedless generation deterministic; callers wanting variety pass a
/// fresh seed.
pub fn default_seed(style: Style) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    style
        .display_name()
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}
