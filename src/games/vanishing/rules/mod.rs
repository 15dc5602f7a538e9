//! Game rules for vanishing tic-tac-toe.
//!
//! Pure functions over a board. They know the grid's shape and nothing
//! about seats, turns, or eviction.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, winning_line};
