//! Vanishing tic-tac-toe: only the seven newest stones stay on the board.

mod move_queue;
mod position;
mod state;
mod types;

pub mod invariants;
pub mod rules;

pub use move_queue::{MAX_STONES_ON_BOARD, MoveQueue};
pub use position::Position;
pub use state::{BoardState, PlaceError};
pub use types::{Board, Square, Symbol};
