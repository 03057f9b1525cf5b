// MIDI Export - Convert generated patterns to MIDI files using midly crate
// Produces DAW-friendly MIDI files with one track per part

use midly::{Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::groove::grid::{TimeSignature, GENERATED_STEPS};
use crate::styles::DrumLaneKind;

use super::pattern::GeneratedPattern;

/// Channel 10 (0-indexed = 9) is drums
const DRUM_CHANNEL: u8 = 9;
const BASS_CHANNEL: u8 = 0;
const CHORD_CHANNEL: u8 = 1;
const MELODY_CHANNEL: u8 = 2;

/// Drum hits are written as short sixteenths
const DRUM_HIT_STEPS: u32 = 1;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("PPQ must be a positive multiple of 4, got {0}")]
    InvalidPpq(u16),

    #[error("Failed to write MIDI: {0}")]
    Write(#[from] std::io::Error),
}

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidiExportOptions {
    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ppq: u16,

    /// Include tempo metadata
    pub include_tempo: bool,

    /// Include time signature metadata
    pub include_time_signature: bool,

    /// Include track names
    pub track_names: bool,

    /// Velocity for every exported note
    pub velocity: u8,
}

impl Default for MidiExportOptions {
    fn default() -> Self {
        MidiExportOptions {
            ppq: 480,
            include_tempo: true,
            include_time_signature: true,
            track_names: true,
            velocity: 100,
        }
    }
}

/// A note span in steps, ready to be turned into on/off events
struct StepNote {
    step: usize,
    duration: u32,
    key: u8,
}

/// Export a generated pattern to MIDI file bytes
///
/// Track 0 holds tempo/time-signature metadata, followed by drums, bass,
/// chords and melody. One step is a sixteenth note (`ppq / 4` ticks).
pub fn export_midi(
    pattern: &GeneratedPattern,
    options: &MidiExportOptions,
) -> Result<Vec<u8>, MidiError> {
    if options.ppq == 0 || options.ppq % 4 != 0 {
        return Err(MidiError::InvalidPpq(options.ppq));
    }
    let ticks_per_step = options.ppq as u32 / 4;

    let header = Header {
        format: midly::Format::Parallel,
        timing: Timing::Metrical(options.ppq.into()),
    };

    let mut tracks = Vec::new();

    // Track 0: Tempo and time signature metadata
    let mut meta_track = Track::new();
    if options.track_names {
        add_track_name(&mut meta_track, "META");
    }
    if options.include_tempo {
        add_tempo(&mut meta_track, pattern.bpm);
    }
    if options.include_time_signature {
        add_time_signature(&mut meta_track, pattern.time_signature);
    }
    add_end_of_track(&mut meta_track, 0);
    tracks.push(meta_track);

    let drums: Vec<StepNote> = pattern
        .drums
        .iter()
        .map(|d| StepNote {
            step: d.step,
            duration: DRUM_HIT_STEPS,
            key: d.kind.gm_note(),
        })
        .collect();
    tracks.push(part_track("DRUMS", DRUM_CHANNEL, &drums, ticks_per_step, options));

    let bass: Vec<StepNote> = pattern
        .bass
        .iter()
        .map(|n| StepNote {
            step: n.step,
            duration: n.duration,
            key: n.note,
        })
        .collect();
    tracks.push(part_track("BASS", BASS_CHANNEL, &bass, ticks_per_step, options));

    let chords: Vec<StepNote> = pattern
        .chords
        .iter()
        .flat_map(|c| {
            c.notes.iter().map(move |&key| StepNote {
                step: c.step,
                duration: c.duration,
                key,
            })
        })
        .collect();
    tracks.push(part_track("CHORDS", CHORD_CHANNEL, &chords, ticks_per_step, options));

    let melody: Vec<StepNote> = pattern
        .melody
        .iter()
        .map(|n| StepNote {
            step: n.step,
            duration: n.duration,
            key: n.note,
        })
        .collect();
    tracks.push(part_track("MELODY", MELODY_CHANNEL, &melody, ticks_per_step, options));

    let smf = Smf { header, tracks };

    let mut bytes = Vec::new();
    smf.write_std(&mut bytes)?;

    log::info!(
        "Exported '{}' to MIDI: {} bytes, {} drum hits",
        pattern.style,
        bytes.len(),
        drums.len()
    );

    Ok(bytes)
}

/// Ticks for the first `GENERATED_STEPS` of a pattern plus the longest tail
fn end_tick(notes: &[StepNote], ticks_per_step: u32) -> u32 {
    let last = notes
        .iter()
        .map(|n| n.step as u32 + n.duration)
        .max()
        .unwrap_or(0)
        .max(GENERATED_STEPS as u32);
    last * ticks_per_step
}

/// Create a MIDI track for one part
fn part_track(
    name: &'static str,
    channel: u8,
    notes: &[StepNote],
    ticks_per_step: u32,
    options: &MidiExportOptions,
) -> Track<'static> {
    let mut track = Track::new();
    let mut events: Vec<(u32, TrackEventKind<'static>)> = Vec::new();

    if options.track_names {
        events.push((0, TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes()))));
    }

    let velocity = options.velocity.clamp(1, 127);
    for note in notes {
        let tick_on = note.step as u32 * ticks_per_step;
        let tick_off = tick_on + note.duration.max(1) * ticks_per_step;

        events.push((
            tick_on,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOn {
                    key: note.key.min(127).into(),
                    vel: velocity.into(),
                },
            },
        ));
        events.push((
            tick_off,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOff {
                    key: note.key.min(127).into(),
                    vel: 0.into(),
                },
            },
        ));
    }

    // Note-offs sort before note-ons on the same tick so repeated keys retrigger
    events.sort_by_key(|(tick, kind)| (*tick, !is_note_off(kind)));

    let mut last_tick = 0;
    for (tick, kind) in events {
        track.push(TrackEvent {
            delta: tick.saturating_sub(last_tick).into(),
            kind,
        });
        last_tick = tick;
    }

    let end = end_tick(notes, ticks_per_step);
    add_end_of_track(&mut track, end.saturating_sub(last_tick));

    track
}

fn is_note_off(kind: &TrackEventKind) -> bool {
    matches!(
        kind,
        TrackEventKind::Midi {
            message: MidiMessage::NoteOff { .. },
            ..
        }
    )
}

/// Add track name to track
fn add_track_name(track: &mut Track<'static>, name: &'static str) {
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(name.as_bytes())),
    });
}

/// Add tempo meta message
fn add_tempo(track: &mut Track, bpm: f64) {
    // Microseconds per quarter note, 24-bit
    let us_per_quarter = ((60_000_000.0 / bpm) as u32).min(0x00FF_FFFF);

    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.into())),
    });
}

/// Add time signature meta message
fn add_time_signature(track: &mut Track, time_signature: TimeSignature) {
    // MIDI clocks per metronome click (24 for quarter note), 8 32nds per quarter
    track.push(TrackEvent {
        delta: 0.into(),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(
            time_signature.beats_per_bar(),
            time_signature.beat_unit_power(),
            24,
            8,
        )),
    });
}

/// Add end of track message
fn add_end_of_track(track: &mut Track, delta: u32) {
    track.push(TrackEvent {
        delta: delta.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
}

/// GM note used for a drum lane in exported files
pub fn drum_note(kind: DrumLaneKind) -> u8 {
    kind.gm_note()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::assembler::generate;
    use crate::generator::pattern::GenerateOverrides;

    fn pattern() -> GeneratedPattern {
        generate("House", &GenerateOverrides::with_seed(12))
    }

    #[test]
    fn test_export_parses_back() {
        let bytes = export_midi(&pattern(), &MidiExportOptions::default()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.format, midly::Format::Parallel);
        // meta + drums + bass + chords + melody
        assert_eq!(smf.tracks.len(), 5);
    }

    #[test]
    fn test_drum_note_ons_match_pattern() {
        let pattern = pattern();
        let bytes = export_midi(&pattern, &MidiExportOptions::default()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let note_ons = smf.tracks[1]
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count();
        assert_eq!(note_ons, pattern.drums.len());
    }

    #[test]
    fn test_tempo_matches_pattern() {
        let mut pattern = pattern();
        pattern.bpm = 120.0;
        let bytes = export_midi(&pattern, &MidiExportOptions::default()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let tempo = smf.tracks[0].iter().find_map(|e| match e.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(u32::from(t)),
            _ => None,
        });
        assert_eq!(tempo, Some(500_000));
    }

    #[test]
    fn test_export_without_metadata() {
        let options = MidiExportOptions {
            include_tempo: false,
            include_time_signature: false,
            track_names: false,
            ..Default::default()
        };
        let bytes = export_midi(&pattern(), &options).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        // Only end of track remains in the meta track
        assert_eq!(smf.tracks[0].len(), 1);
    }

    #[test]
    fn test_invalid_ppq() {
        let options = MidiExportOptions {
            ppq: 481,
            ..Default::default()
        };
        assert!(matches!(
            export_midi(&pattern(), &options),
            Err(MidiError::InvalidPpq(481))
        ));
    }

    #[test]
    fn test_track_length_covers_four_bars() {
        let bytes = export_midi(&pattern(), &MidiExportOptions::default()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        let total: u32 = smf.tracks[1].iter().map(|e| u32::from(e.delta)).sum();
        assert!(total >= 64 * 120);
    }

    #[test]
    fn test_drum_note_mapping() {
        assert_eq!(drum_note(DrumLaneKind::Kick), 36);
        assert_eq!(drum_note(DrumLaneKind::Snare), 38);
    }
}
