//! Board plus its move queue, kept in lockstep.

use super::move_queue::MoveQueue;
use super::rules;
use super::types::{Board, Square, Symbol};
use super::Position;
use tracing::{debug, instrument};

/// Errors from placing a stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum PlaceError {
    /// The target cell already holds a stone.
    #[display("Square {} is already occupied", _0)]
    Occupied(Position),
}

impl std::error::Error for PlaceError {}

/// The 9-cell grid, the turn indicator, and the FIFO of occupied cells.
///
/// Every occupied cell appears in the queue exactly once, in placement order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    board: Board,
    queue: MoveQueue,
    current: Symbol,
    placements: usize,
}

impl BoardState {
    /// Creates an empty board state with `First` to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            queue: MoveQueue::new(),
            current: Symbol::First,
            placements: 0,
        }
    }

    /// Symbol to move next.
    pub fn current_turn(&self) -> Symbol {
        self.current
    }

    /// Hands the move to the other symbol.
    pub fn flip_turn(&mut self) {
        self.current = self.current.opponent();
    }

    /// Stones placed since the last reset, evicted ones included.
    pub fn placements(&self) -> usize {
        self.placements
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the move queue.
    pub fn queue(&self) -> &MoveQueue {
        &self.queue
    }

    /// Places a stone and records it as the newest move.
    ///
    /// Turn ownership is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns `PlaceError::Occupied` if the cell is taken; nothing changes.
    #[instrument(skip(self), fields(queue_len = self.queue.len()))]
    pub fn place(&mut self, pos: Position, symbol: Symbol) -> Result<(), PlaceError> {
        if !self.board.is_empty(pos) {
            return Err(PlaceError::Occupied(pos));
        }
        self.board.set(pos, Square::Occupied(symbol));
        self.queue.push(pos);
        self.placements += 1;
        Ok(())
    }

    /// Clears the oldest stone once more than seven are recorded.
    #[instrument(skip(self))]
    pub fn evict_oldest_if_over_capacity(&mut self) -> Option<Position> {
        let evicted = self.queue.pop_if_over_capacity()?;
        self.board.set(evicted, Square::Empty);
        debug!(index = evicted.to_index(), "Evicted oldest stone");
        Some(evicted)
    }

    /// The stone that the next placement would evict, if the board is at capacity.
    pub fn peek_oldest_if_at_capacity(&self) -> Option<Position> {
        self.queue.oldest_if_at_capacity()
    }

    /// True iff all nine cells are occupied.
    pub fn is_full(&self) -> bool {
        rules::is_full(&self.board)
    }

    /// Clears all cells and the queue, and gives the move back to `First`.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.queue.clear();
        self.current = Symbol::First;
        self.placements = 0;
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}
