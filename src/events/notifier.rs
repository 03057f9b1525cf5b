// Notifier - Fan-out of notifications to subscribed collaborators
// Sends never block; closed subscribers are dropped on the next emit

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{channel, Receiver, Sender};

use super::types::Notification;

/// Notifications a subscriber may leave unread before new ones are dropped for it
pub const SUBSCRIBER_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<Sender<Notification>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber
    pub fn subscribe(&mut self) -> Receiver<Notification> {
        let (tx, rx) = channel(SUBSCRIBER_CAPACITY);
        self.subscribers.push(tx);
        rx
    }

    /// Send to every live subscriber
    ///
    /// A subscriber whose queue is full misses this notification.
    pub fn emit(&mut self, notification: Notification) {
        if self.subscribers.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| match tx.try_send(notification.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(dropped)) => {
                    log::debug!("Subscriber lagging; dropped {}", dropped.name());
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives() {
        let mut notifier = Notifier::new();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        notifier.emit(Notification::StepTriggered { step: 1, tracks: vec![] });

        assert!(matches!(a.try_recv(), Ok(Notification::StepTriggered { step: 1, .. })));
        assert!(matches!(b.try_recv(), Ok(Notification::StepTriggered { step: 1, .. })));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let mut notifier = Notifier::new();
        let keep = notifier.subscribe();
        let dropped = notifier.subscribe();
        drop(dropped);

        notifier.emit(Notification::StepTriggered { step: 0, tracks: vec![] });
        assert_eq!(notifier.subscriber_count(), 1);
        drop(keep);
    }

    #[test]
    fn test_idle_subscriber_queue_is_bounded() {
        let mut notifier = Notifier::new();
        let mut idle = notifier.subscribe();
        let mut active = notifier.subscribe();

        for step in 0..SUBSCRIBER_CAPACITY + 10 {
            notifier.emit(Notification::StepTriggered { step, tracks: vec![] });
            assert!(active.try_recv().is_ok());
        }

        // The idle subscriber stays registered but only holds the first batch
        assert_eq!(notifier.subscriber_count(), 2);
        let mut queued = 0;
        while let Ok(notification) = idle.try_recv() {
            if let Notification::StepTriggered { step, .. } = notification {
                assert!(step < SUBSCRIBER_CAPACITY);
            }
            queued += 1;
        }
        assert_eq!(queued, SUBSCRIBER_CAPACITY);
    }
}
