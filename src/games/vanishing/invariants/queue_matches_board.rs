//! Queue consistency invariant: the queue lists exactly the occupied cells.

use super::super::BoardState;
use super::Invariant;
use std::collections::HashSet;

/// Invariant: queue length equals the number of occupied cells, and every
/// queued cell is occupied and listed once.
pub struct QueueMatchesBoardInvariant;

impl Invariant<BoardState> for QueueMatchesBoardInvariant {
    fn holds(state: &BoardState) -> bool {
        let board = state.board();
        let mut seen = HashSet::new();
        let queued_all_occupied = state
            .queue()
            .iter()
            .all(|pos| !board.is_empty(pos) && seen.insert(pos));

        queued_all_occupied && state.queue().len() == board.occupied()
    }

    fn description() -> &'static str {
        "Move queue matches occupied squares"
    }
}
