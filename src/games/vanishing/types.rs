//! Core domain types for vanishing tic-tac-toe.

use serde::{Serialize, Serializer};

/// One of the two game pieces.
///
/// On the wire `First` is `"〇"` and `Second` is `"×"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum Symbol {
    /// Moves first in every round.
    #[serde(rename = "〇")]
    #[strum(to_string = "〇")]
    First,
    /// Moves second.
    #[serde(rename = "×")]
    #[strum(to_string = "×")]
    Second,
}

impl Symbol {
    /// Returns the other symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::First => Symbol::Second,
            Symbol::Second => Symbol::First,
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Square {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell holding a stone.
    Occupied(Symbol),
}

impl Square {
    /// Returns the symbol on this cell, if any.
    pub fn symbol(self) -> Option<Symbol> {
        match self {
            Square::Empty => None,
            Square::Occupied(symbol) => Some(symbol),
        }
    }
}

// Clients expect empty cells as "" next to the symbol strings.
impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Square::Empty => serializer.serialize_str(""),
            Square::Occupied(symbol) => symbol.serialize(serializer),
        }
    }
}

/// 3x3 board in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    squares: [Square; 9],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Gets the square at a position.
    pub fn get(&self, pos: super::Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Sets the square at a position.
    pub fn set(&mut self, pos: super::Position, square: Square) {
        self.squares[pos.to_index()] = square;
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: super::Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let cell = match self.squares[pos] {
                    Square::Empty => pos.to_string(),
                    Square::Occupied(symbol) => symbol.to_string(),
                };
                result.push_str(&cell);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
