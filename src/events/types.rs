// Notification types
// Outbound messages for collaborators; the core produces them, never consumes them

use serde::{Deserialize, Serialize};

/// Transport state of the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }
}

/// Something a UI or logger may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// A pattern was generated (or loaded from a generation)
    PatternGenerated {
        style: String,
        seed: u64,
        bpm: f64,
    },

    /// A tick evaluated `step`; `tracks` lists the drum tracks that fired
    StepTriggered { step: usize, tracks: Vec<usize> },

    /// Play/pause/stop changed the transport
    PlaybackStateChanged { state: PlaybackState, step: usize },
}

impl Notification {
    /// Short name used in logs and journals
    pub fn name(&self) -> &'static str {
        match self {
            Notification::PatternGenerated { .. } => "pattern_generated",
            Notification::StepTriggered { .. } => "step_triggered",
            Notification::PlaybackStateChanged { .. } => "playback_state_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_json_is_tagged() {
        let value = serde_json::to_value(Notification::StepTriggered {
            step: 3,
            tracks: vec![0, 2],
        })
        .unwrap();

        assert_eq!(value["event"], "step_triggered");
        assert_eq!(value["step"], 3);
        assert_eq!(value["tracks"][1], 2);
    }

    #[test]
    fn test_playback_state_serialization() {
        let value = serde_json::to_value(Notification::PlaybackStateChanged {
            state: PlaybackState::Playing,
            step: 0,
        })
        .unwrap();
        assert_eq!(value["state"], "playing");
    }

    #[test]
    fn test_names() {
        let n = Notification::PatternGenerated {
            style: "House".to_string(),
            seed: 1,
            bpm: 124.0,
        };
        assert_eq!(n.name(), "pattern_generated");
        assert!(!PlaybackState::default().is_playing());
    }
}
