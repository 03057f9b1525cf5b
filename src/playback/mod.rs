// Playback - Abstract trigger interface to an external sound engine

pub mod trigger;

pub use trigger::{
    deliver, LogSink, NullSink, PercussionTrigger, PitchedTrigger, RecordingSink, Trigger,
    TriggerError, TriggerSink,
};
