// Events module
// Outbound notifications, subscriber fan-out, and the JSONL journal

pub mod journal;
pub mod notifier;
pub mod types;

pub use journal::{read_journal, Journal, JournalEntry, JournalError};
pub use notifier::Notifier;
pub use types::{Notification, PlaybackState};
