//! The move queue never holds more than seven stones between handlers.

use super::super::BoardState;
use super::super::move_queue::MAX_STONES_ON_BOARD;
use super::Invariant;

/// Invariant: at most `MAX_STONES_ON_BOARD` recorded stones.
pub struct BoundedQueueInvariant;

impl Invariant<BoardState> for BoundedQueueInvariant {
    fn holds(state: &BoardState) -> bool {
        state.queue().len() <= MAX_STONES_ON_BOARD
    }

    fn description() -> &'static str {
        "Move queue holds at most seven stones"
    }
}
