//! Draw detection.
//!
//! Eviction keeps at most seven stones on the board, so a full board only
//! shows up if that cap is bypassed. The check stays as a safety net.

use super::super::{Board, Square};
use super::win::winning_line;
use tracing::instrument;

/// Checks if every square is occupied.
#[instrument(skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

/// A full board with no completed line.
#[instrument(skip(board))]
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && winning_line(board).is_none()
}
