//! Placement-ordered record of occupied cells.

use super::Position;
use std::collections::VecDeque;

/// Most stones that stay on the board; the 8th and later moves evict the oldest.
pub const MAX_STONES_ON_BOARD: usize = 7;

/// FIFO of occupied positions, oldest first.
///
/// Holds at most `MAX_STONES_ON_BOARD + 1` entries, and only between a
/// placement and the eviction that follows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveQueue {
    entries: VecDeque<Position>,
}

impl MoveQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_STONES_ON_BOARD + 1),
        }
    }

    /// Records a placement.
    pub fn push(&mut self, pos: Position) {
        self.entries.push_back(pos);
    }

    /// Removes the oldest entry if the queue is over capacity.
    pub fn pop_if_over_capacity(&mut self) -> Option<Position> {
        if self.entries.len() > MAX_STONES_ON_BOARD {
            self.entries.pop_front()
        } else {
            None
        }
    }

    /// The oldest entry, once the queue has reached capacity.
    pub fn oldest_if_at_capacity(&self) -> Option<Position> {
        if self.entries.len() >= MAX_STONES_ON_BOARD {
            self.entries.front().copied()
        } else {
            None
        }
    }

    /// Number of recorded stones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.entries.iter().copied()
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
