// Edit History - Bounded undo/redo over full snapshots
// The cursor always points at the snapshot matching the live state

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<T> {
    entries: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> History<T> {
    /// Start a history whose first entry is `initial`
    pub fn new(initial: T, capacity: usize) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1));
        entries.push_back(initial);
        History {
            entries,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record the state after an edit
    ///
    /// Anything that could have been redone is discarded; when full, the
    /// oldest snapshot is evicted.
    pub fn record(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(snapshot);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back; `None` at the oldest entry
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; `None` at the newest entry
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walk() {
        let mut history = History::new(0, 10);
        history.record(1);
        history.record(2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);

        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_record_discards_redo() {
        let mut history = History::new(0, 10);
        history.record(1);
        history.record(2);
        history.undo();

        history.record(3);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new(0, 3);
        for value in 1..=5 {
            history.record(value);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_zero_capacity_keeps_current() {
        let mut history = History::new("a", 0);
        history.record("b");
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
    }
}
