/// Snapshot history for undo/redo.
///
/// Snapshots are whole values, so restoring one can never leave part of
/// the bundle behind.

#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    undo: Vec<T>,
    redo: Vec<T>,
    depth: usize,
}

impl<T: Clone> HistoryStack<T> {
    /// `depth` 0 keeps every snapshot.
    pub fn new(depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            depth,
        }
    }

    /// Record the state that is about to be replaced. Clears redo.
    pub fn push_snapshot(&mut self, snapshot: T) {
        if self.depth > 0 && self.undo.len() >= self.depth {
            self.undo.remove(0);
        }
        self.undo.push(snapshot);
        self.redo.clear();
    }

    /// Swap `current` for the most recent snapshot.
    pub fn undo(&mut self, current: T) -> Option<T> {
        let previous = self.undo.pop()?;
        self.redo.push(current);
        Some(previous)
    }

    pub fn redo(&mut self, current: T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo_round_trips() {
        let mut h = HistoryStack::new(0);
        h.push_snapshot(1);
        h.push_snapshot(2);
        // current is 3
        assert_eq!(h.undo(3), Some(2));
        assert_eq!(h.undo(2), Some(1));
        assert_eq!(h.undo(1), None);
        assert_eq!(h.redo(1), Some(2));
        assert_eq!(h.redo(2), Some(3));
        assert_eq!(h.redo(3), None);
    }

    #[test]
    fn new_snapshot_clears_redo() {
        let mut h = HistoryStack::new(0);
        h.push_snapshot("a");
        assert_eq!(h.undo("b"), Some("a"));
        assert!(h.can_redo());
        h.push_snapshot("a");
        assert!(!h.can_redo());
    }

    #[test]
    fn depth_drops_oldest() {
        let mut h = HistoryStack::new(2);
        h.push_snapshot(1);
        h.push_snapshot(2);
        h.push_snapshot(3);
        assert_eq!(h.undo_len(), 2);
        assert_eq!(h.undo(4), Some(3));
        assert_eq!(h.undo(3), Some(2));
        assert_eq!(h.undo(2), None);
    }
}
