use std::collections::VecDeque;

/// Bounded undo/redo stack of whole-state snapshots.
///
/// The cursor points at the snapshot matching the current state. Pushing
/// after an undo discards the redo tail; pushing past capacity drops the
/// oldest snapshot.
#[derive(Clone, Debug)]
pub struct History<T> {
    snapshots: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> History<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.cursor)
    }

    pub fn push(&mut self, snapshot: T) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Forgets everything and starts over from `snapshot`.
    pub fn reset(&mut self, snapshot: T) {
        self.snapshots.clear();
        self.cursor = 0;
        self.push(snapshot);
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Steps back. Returns the snapshot to restore and the one that was undone.
    pub fn undo(&mut self) -> Option<(&T, &T)> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some((&self.snapshots[self.cursor], &self.snapshots[self.cursor + 1]))
    }

    /// Steps forward. Returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }
}
