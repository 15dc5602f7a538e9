//! Alternating turn invariant: turn follows the parity of placements.

use super::super::{BoardState, Symbol};
use super::Invariant;

/// Invariant: `First` is to move after an even number of placements in the
/// round, `Second` after an odd number.
pub struct AlternatingTurnInvariant;

impl Invariant<BoardState> for AlternatingTurnInvariant {
    fn holds(state: &BoardState) -> bool {
        let expected = if state.placements() % 2 == 0 {
            Symbol::First
        } else {
            Symbol::Second
        };
        state.current_turn() == expected
    }

    fn description() -> &'static str {
        "Turn alternates with each placement"
    }
}
