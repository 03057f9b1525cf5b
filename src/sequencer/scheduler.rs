// Step Sequencer - Playback state machine, tick evaluation, and grid editing
// A tick is one synchronous unit of work; wall-clock pacing lives in the transport

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::Receiver;

use super::history::History;
use super::notes::{lanes_from_pattern, NoteLane};
use super::presets::Preset;
use super::track::{
    default_kit, lane_instrument, random_density, DrumStep, DrumTrack, PatternLength, StepPatch,
};
use crate::config::SequencerConfig;
use crate::events::{Notification, Notifier, PlaybackState};
use crate::generator::{clock_seed, GeneratedPattern, SeededRng};
use crate::groove::feel::{groove_velocity, swing_interval};
use crate::groove::grid::{clamp_bpm, step_duration_secs};
use crate::playback::{deliver, PercussionTrigger, PitchedTrigger, Trigger, TriggerSink};
use crate::styles::{midi_to_note_name, DrumLaneKind};

pub const DEFAULT_BPM: f64 = 120.0;

/// Velocity range used by `randomize`
const RANDOM_VELOCITY: (i32, i32) = (70, 127);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequencerError {
    #[error("Track index {index} out of range ({len} tracks)")]
    TrackOutOfRange { index: usize, len: usize },

    #[error("Step index {index} out of range (pattern length {len})")]
    StepOutOfRange { index: usize, len: usize },

    #[error("Unsupported pattern length {0} (expected 8, 16, 32 or 64)")]
    InvalidPatternLength(usize),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}

pub type SequencerResult<T> = Result<T, SequencerError>;

/// Transport-visible scheduler state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerState {
    pub current_step: usize,
    pub pattern_length: PatternLength,
    pub bpm: f64,
    /// Percent (0-100)
    pub swing: f64,
    /// Percent (0-100)
    pub groove: f64,
    pub playback: PlaybackState,
}

impl Default for SchedulerState {
    fn default() -> Self {
        SchedulerState {
            current_step: 0,
            pattern_length: PatternLength::default(),
            bpm: DEFAULT_BPM,
            swing: 0.0,
            groove: 0.0,
            playback: PlaybackState::Stopped,
        }
    }
}

impl SchedulerState {
    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }
}

/// A percussion hit to deliver `delay` after its tick (flams and rolls)
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredHit {
    pub delay: Duration,
    pub hit: PercussionTrigger,
}

/// Result of evaluating one step
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub step: usize,
    /// Time until the next tick is due
    pub interval: Duration,
    /// Drum track indices whose primary hit fired
    pub fired: Vec<usize>,
    pub deferred: Vec<DeferredHit>,
}

/// What undo and redo bring back: the grid plus the pitched lanes loaded with it
#[derive(Debug, Clone)]
struct Snapshot {
    tracks: Vec<DrumTrack>,
    note_lanes: Vec<NoteLane>,
}

pub struct Sequencer {
    config: SequencerConfig,
    state: SchedulerState,
    tracks: Vec<DrumTrack>,
    note_lanes: Vec<NoteLane>,
    history: History<Snapshot>,
    clipboard: Option<Vec<DrumStep>>,
    rng: SeededRng,
    notifier: Notifier,
    sink: Box<dyn TriggerSink>,
}

impl Sequencer {
    /// A stopped sequencer with the default 8-track kit and 16 steps
    pub fn new(config: SequencerConfig, sink: Box<dyn TriggerSink>) -> Self {
        let config = config.sanitized();
        let tracks = default_kit(PatternLength::default());
        let seed = config.seed.unwrap_or_else(clock_seed);

        Sequencer {
            history: History::new(
                Snapshot {
                    tracks: tracks.clone(),
                    note_lanes: Vec::new(),
                },
                config.history_capacity,
            ),
            rng: SeededRng::new(seed),
            config,
            state: SchedulerState::default(),
            tracks,
            note_lanes: Vec::new(),
            clipboard: None,
            notifier: Notifier::new(),
            sink,
        }
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn tracks(&self) -> &[DrumTrack] {
        &self.tracks
    }

    pub fn track(&self, index: usize) -> SequencerResult<&DrumTrack> {
        let len = self.tracks.len();
        self.tracks
            .get(index)
            .ok_or(SequencerError::TrackOutOfRange { index, len })
    }

    pub fn note_lanes(&self) -> &[NoteLane] {
        &self.note_lanes
    }

    /// Swap the sound engine
    pub fn set_sink(&mut self, sink: Box<dyn TriggerSink>) {
        self.sink = sink;
    }

    /// Receive every notification emitted from now on
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Stopped -> Playing, continuing from the current step
    pub fn play(&mut self) {
        if self.state.is_playing() {
            return;
        }
        self.state.playback = PlaybackState::Playing;
        log::info!(
            "Playback started at step {} ({:.1} BPM)",
            self.state.current_step,
            self.state.bpm
        );
        self.emit_playback_state();
    }

    /// Playing -> Stopped, keeping the current step
    pub fn pause(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        self.state.playback = PlaybackState::Stopped;
        log::info!("Playback paused at step {}", self.state.current_step);
        self.emit_playback_state();
    }

    /// Stop and rewind to step 0; a no-op when already stopped at step 0
    pub fn stop(&mut self) {
        if !self.state.is_playing() && self.state.current_step == 0 {
            return;
        }
        self.state.playback = PlaybackState::Stopped;
        self.state.current_step = 0;
        log::info!("Playback stopped");
        self.emit_playback_state();
    }

    fn emit_playback_state(&mut self) {
        self.notifier.emit(Notification::PlaybackStateChanged {
            state: self.state.playback,
            step: self.state.current_step,
        });
    }

    /// Evaluate the current step and advance; `None` while stopped
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.state.is_playing() {
            return None;
        }

        let step = self.state.current_step;
        let bpm = self.state.bpm;
        let interval = swing_interval(bpm, step, self.state.swing);
        let groove = self.state.groove;
        let has_solo = self.tracks.iter().any(|t| t.solo);

        let mut fired = Vec::new();
        let mut deferred = Vec::new();

        for (index, track) in self.tracks.iter().enumerate() {
            let Some(cell) = track.pattern.get(step).copied() else {
                continue;
            };
            // Mute wins over solo
            if !cell.active || track.muted || (has_solo && !track.solo) {
                continue;
            }
            if self.rng.next_f64() * 100.0 > f64::from(cell.probability) {
                continue;
            }

            let hit = PercussionTrigger {
                instrument: track.instrument.clone(),
                velocity: groove_velocity(cell.velocity, step, groove),
                track_volume: track.volume,
                pan: track.pan,
                pitch: cell.pitch,
            };
            deliver(self.sink.as_mut(), &Trigger::Percussion(hit.clone()));
            fired.push(index);

            if cell.flam {
                deferred.push(DeferredHit {
                    delay: Duration::from_millis(self.config.flam_delay_ms),
                    hit: PercussionTrigger {
                        velocity: scale_velocity(hit.velocity, self.config.flam_velocity_ratio),
                        ..hit.clone()
                    },
                });
            }

            if cell.roll > 1 {
                let strokes = u32::from(cell.roll);
                let mut velocity = f64::from(hit.velocity);
                for k in 1..strokes {
                    velocity *= self.config.roll_decay;
                    deferred.push(DeferredHit {
                        delay: interval * k / strokes,
                        hit: PercussionTrigger {
                            velocity: velocity.round().clamp(0.0, 127.0) as u8,
                            ..hit.clone()
                        },
                    });
                }
            }
        }

        let base = step_duration_secs(bpm);
        for lane in self.note_lanes.iter().filter(|l| !l.muted) {
            for note in lane.notes_at(step) {
                let (name, octave) = midi_to_note_name(note.note);
                let trigger = Trigger::Pitched(PitchedTrigger {
                    note: name.to_string(),
                    octave,
                    duration_secs: f64::from(note.duration) * base,
                    instrument: lane.instrument.clone(),
                    velocity: (f32::from(note.velocity) / 127.0) * (f32::from(lane.volume) / 100.0),
                });
                deliver(self.sink.as_mut(), &trigger);
            }
        }

        log::debug!("Step {:>2}: {} hits, next in {:?}", step, fired.len(), interval);
        self.notifier.emit(Notification::StepTriggered {
            step,
            tracks: fired.clone(),
        });
        self.state.current_step = (step + 1) % self.state.pattern_length.steps();

        Some(TickOutcome {
            step,
            interval,
            fired,
            deferred,
        })
    }

    /// Deliver a flam or roll stroke through the same failure boundary as ticks
    pub fn fire_deferred(&mut self, deferred: &DeferredHit) -> bool {
        deliver(
            self.sink.as_mut(),
            &Trigger::Percussion(deferred.hit.clone()),
        )
    }

    // ------------------------------------------------------------------
    // Global parameters (not part of undo history)
    // ------------------------------------------------------------------

    /// Set tempo, clamped to [40, 300]; returns the applied value
    pub fn set_tempo(&mut self, bpm: f64) -> f64 {
        self.state.bpm = clamp_bpm(bpm);
        self.state.bpm
    }

    pub fn set_swing(&mut self, percent: f64) -> f64 {
        self.state.swing = clamp_percent(percent);
        self.state.swing
    }

    pub fn set_groove(&mut self, percent: f64) -> f64 {
        self.state.groove = clamp_percent(percent);
        self.state.groove
    }

    /// Resize every track; the current step wraps into the new length
    pub fn set_pattern_length(&mut self, steps: usize) -> SequencerResult<()> {
        let length =
            PatternLength::from_steps(steps).ok_or(SequencerError::InvalidPatternLength(steps))?;
        if length == self.state.pattern_length {
            return Ok(());
        }
        self.apply_length(length);
        self.commit();
        log::info!("Pattern length set to {}", steps);
        Ok(())
    }

    fn apply_length(&mut self, length: PatternLength) {
        for track in &mut self.tracks {
            track.resize(length);
        }
        self.state.pattern_length = length;
        self.state.current_step %= length.steps();
    }

    // ------------------------------------------------------------------
    // Grid edits (recorded in history)
    // ------------------------------------------------------------------

    /// Flip a step; returns its new active state
    pub fn toggle_step(&mut self, track: usize, step: usize) -> SequencerResult<bool> {
        let cell = self.cell_mut(track, step)?;
        cell.active = !cell.active;
        let active = cell.active;
        self.commit();
        Ok(active)
    }

    pub fn set_step_param(
        &mut self,
        track: usize,
        step: usize,
        patch: StepPatch,
    ) -> SequencerResult<DrumStep> {
        let cell = self.cell_mut(track, step)?;
        patch.apply(cell);
        let updated = *cell;
        self.commit();
        Ok(updated)
    }

    /// Refill every track with random hits at per-instrument densities
    pub fn randomize(&mut self) {
        for track in &mut self.tracks {
            let density = random_density(&track.instrument);
            for cell in &mut track.pattern {
                *cell = if self.rng.chance(density) {
                    let velocity = self.rng.range_i32(RANDOM_VELOCITY.0, RANDOM_VELOCITY.1);
                    DrumStep::hit(velocity as u8)
                } else {
                    DrumStep::default()
                };
            }
        }
        self.commit();
    }

    pub fn clear(&mut self) {
        for track in &mut self.tracks {
            track.clear();
        }
        self.commit();
    }

    pub fn load_preset(&mut self, name: &str) -> SequencerResult<Preset> {
        let preset =
            Preset::from_name(name).ok_or_else(|| SequencerError::UnknownPreset(name.to_string()))?;
        preset.apply(&mut self.tracks);
        self.commit();
        log::info!("Loaded preset '{}'", preset.name());
        Ok(preset)
    }

    pub fn copy_track_pattern(&mut self, track: usize) -> SequencerResult<()> {
        let pattern = self.track(track)?.pattern.clone();
        self.clipboard = Some(pattern);
        Ok(())
    }

    /// Paste the clipboard onto a track; `false` when nothing was copied
    pub fn paste_track_pattern(&mut self, track: usize) -> SequencerResult<bool> {
        let len = self.track(track)?.len();
        let Some(mut pattern) = self.clipboard.clone() else {
            return Ok(false);
        };
        pattern.resize(len, DrumStep::default());
        self.tracks[track].pattern = pattern;
        self.commit();
        Ok(true)
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    /// Nudge the velocity of every active step by up to ±amount/2
    ///
    /// Returns how many steps were touched. Timing is never changed.
    pub fn humanize(&mut self, amount: f64) -> usize {
        let amount = if amount.is_finite() {
            amount.clamp(0.0, 127.0)
        } else {
            0.0
        };
        let spread = amount * 0.5;
        let mut touched = 0;
        for track in &mut self.tracks {
            for cell in track.pattern.iter_mut().filter(|c| c.active) {
                let offset = (self.rng.next_f64() * 2.0 - 1.0) * spread;
                cell.velocity = (f64::from(cell.velocity) + offset).round().clamp(1.0, 127.0) as u8;
                touched += 1;
            }
        }
        if touched > 0 {
            self.commit();
        }
        touched
    }

    /// Copy a generated pattern into the grid and note lanes
    ///
    /// Sets the pattern length to 64 and adopts the pattern's tempo. Drum
    /// lanes land on the kit tracks that play them; other tracks are cleared.
    /// Undo brings back the previous grid and note lanes but keeps the tempo.
    pub fn load_generated(&mut self, pattern: &GeneratedPattern) {
        self.state.bpm = clamp_bpm(pattern.bpm);
        self.apply_length(PatternLength::SixtyFour);
        for track in &mut self.tracks {
            track.clear();
        }

        for kind in DrumLaneKind::ALL {
            let instrument = lane_instrument(kind);
            let Some(track) = self.tracks.iter_mut().find(|t| t.instrument == instrument) else {
                log::warn!("No track plays '{}'; {} hits dropped", instrument, kind.as_str());
                continue;
            };
            let velocity = if kind == DrumLaneKind::Hihat { 80 } else { 100 };
            for event in pattern.drums_of(kind) {
                if let Some(cell) = track.pattern.get_mut(event.step) {
                    *cell = DrumStep::hit(velocity);
                }
            }
        }

        self.note_lanes = lanes_from_pattern(pattern);
        self.commit();

        log::info!(
            "Loaded {} pattern (seed {}, {:.1} BPM)",
            pattern.style,
            pattern.seed,
            pattern.bpm
        );
        self.notifier.emit(Notification::PatternGenerated {
            style: pattern.style.clone(),
            seed: pattern.seed,
            bpm: self.state.bpm,
        });
    }

    /// Replace all tracks, e.g. from storage
    ///
    /// Every track is resized to the length of the first one.
    pub fn replace_tracks(&mut self, mut tracks: Vec<DrumTrack>) -> SequencerResult<()> {
        let length = match tracks.first() {
            Some(first) => PatternLength::from_steps(first.len())
                .ok_or(SequencerError::InvalidPatternLength(first.len()))?,
            None => self.state.pattern_length,
        };
        for track in &mut tracks {
            track.resize(length);
        }
        self.tracks = tracks;
        self.apply_length(length);
        self.commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit(&mut self) {
        self.history.record(Snapshot {
            tracks: self.tracks.clone(),
            note_lanes: self.note_lanes.clone(),
        });
    }

    /// Bring back a snapshot, keeping the live mixer settings
    fn restore(&mut self, snapshot: Snapshot) {
        let Snapshot {
            tracks: mut snapshot,
            note_lanes,
        } = snapshot;
        for track in &mut snapshot {
            if let Some(live) = self.tracks.iter().find(|t| t.id == track.id) {
                track.copy_mix_from(live);
            }
        }
        let length = snapshot
            .first()
            .and_then(|t| PatternLength::from_steps(t.len()))
            .unwrap_or(self.state.pattern_length);
        self.tracks = snapshot;
        self.note_lanes = note_lanes;
        self.state.pattern_length = length;
        self.state.current_step %= length.steps();
    }

    // ------------------------------------------------------------------
    // Track controls (not part of undo history)
    // ------------------------------------------------------------------

    pub fn set_track_volume(&mut self, track: usize, volume: u8) -> SequencerResult<u8> {
        let track = self.track_mut(track)?;
        track.volume = volume.min(100);
        Ok(track.volume)
    }

    pub fn set_track_pan(&mut self, track: usize, pan: i8) -> SequencerResult<i8> {
        let track = self.track_mut(track)?;
        track.pan = pan.clamp(-100, 100);
        Ok(track.pan)
    }

    pub fn toggle_mute(&mut self, track: usize) -> SequencerResult<bool> {
        let track = self.track_mut(track)?;
        track.muted = !track.muted;
        Ok(track.muted)
    }

    pub fn toggle_solo(&mut self, track: usize) -> SequencerResult<bool> {
        let track = self.track_mut(track)?;
        track.solo = !track.solo;
        Ok(track.solo)
    }

    fn track_mut(&mut self, index: usize) -> SequencerResult<&mut DrumTrack> {
        let len = self.tracks.len();
        self.tracks
            .get_mut(index)
            .ok_or(SequencerError::TrackOutOfRange { index, len })
    }

    fn cell_mut(&mut self, track: usize, step: usize) -> SequencerResult<&mut DrumStep> {
        let track = self.track_mut(track)?;
        let len = track.len();
        track
            .pattern
            .get_mut(step)
            .ok_or(SequencerError::StepOutOfRange { index: step, len })
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn scale_velocity(velocity: u8, ratio: f64) -> u8 {
    (f64::from(velocity) * ratio).round().clamp(0.0, 127.0) as u8
}
