//! Seat registry for the single game session.

use crate::games::vanishing::Symbol;
use tracing::{debug, info, instrument, warn};

/// Seats in a session.
pub const SEAT_CAPACITY: usize = 2;

/// Transport-provided identity of a live connection.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Display,
    derive_more::From,
)]
#[display("conn-{}", _0)]
pub struct ConnectionId(u64);

/// Outcome of asking for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Seated with this symbol.
    Seated(Symbol),
    /// Both seats are taken.
    Rejected,
}

/// Occupied seats in arrival order.
///
/// A symbol is held by at most one connection. When a seat frees up, the
/// next admission takes the lowest symbol nobody holds.
#[derive(Debug, Clone, Default)]
pub struct SeatRegistry {
    seats: Vec<(ConnectionId, Symbol)>,
}

impl SeatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            seats: Vec::with_capacity(SEAT_CAPACITY),
        }
    }

    /// Seats a connection if there is room.
    ///
    /// Admitting an already seated connection returns its existing symbol.
    #[instrument(skip(self), fields(occupancy = self.seats.len()))]
    pub fn admit(&mut self, connection: ConnectionId) -> Admission {
        if let Some(symbol) = self.symbol_of(connection) {
            debug!(%connection, %symbol, "Connection already seated");
            return Admission::Seated(symbol);
        }

        if self.seats.len() >= SEAT_CAPACITY {
            warn!(%connection, "Room full, rejecting connection");
            return Admission::Rejected;
        }

        let symbol = if self.is_held(Symbol::First) {
            Symbol::Second
        } else {
            Symbol::First
        };
        self.seats.push((connection, symbol));
        info!(%connection, %symbol, occupancy = self.seats.len(), "Seated connection");
        Admission::Seated(symbol)
    }

    /// Frees the connection's seat. Unknown connections are ignored.
    #[instrument(skip(self))]
    pub fn release(&mut self, connection: ConnectionId) -> Option<Symbol> {
        let index = self.seats.iter().position(|(id, _)| *id == connection)?;
        let (_, symbol) = self.seats.remove(index);
        info!(%connection, %symbol, occupancy = self.seats.len(), "Released seat");
        Some(symbol)
    }

    /// Symbol held by a connection.
    pub fn symbol_of(&self, connection: ConnectionId) -> Option<Symbol> {
        self.seats
            .iter()
            .find(|(id, _)| *id == connection)
            .map(|(_, symbol)| *symbol)
    }

    /// Number of seated connections (0-2).
    pub fn occupancy(&self) -> usize {
        self.seats.len()
    }

    /// Seated connections in arrival order.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.seats.iter().map(|(id, _)| *id)
    }

    fn is_held(&self, symbol: Symbol) -> bool {
        self.seats.iter().any(|(_, held)| *held == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::from(n)
    }

    #[test]
    fn test_arrival_order_assigns_symbols() {
        let mut registry = SeatRegistry::new();
        assert_eq!(registry.admit(conn(1)), Admission::Seated(Symbol::First));
        assert_eq!(registry.admit(conn(2)), Admission::Seated(Symbol::Second));
        assert_eq!(registry.occupancy(), 2);
    }

    #[test]
    fn test_third_connection_rejected() {
        let mut registry = SeatRegistry::new();
        registry.admit(conn(1));
        registry.admit(conn(2));
        assert_eq!(registry.admit(conn(3)), Admission::Rejected);
        assert_eq!(registry.symbol_of(conn(3)), None);
        assert_eq!(registry.occupancy(), 2);
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let mut registry = SeatRegistry::new();
        registry.admit(conn(1));
        assert_eq!(registry.release(conn(9)), None);
        assert_eq!(registry.occupancy(), 1);
    }

    #[test]
    fn test_freed_first_seat_goes_to_next_admission() {
        let mut registry = SeatRegistry::new();
        registry.admit(conn(1));
        registry.admit(conn(2));
        assert_eq!(registry.release(conn(1)), Some(Symbol::First));

        assert_eq!(registry.admit(conn(3)), Admission::Seated(Symbol::First));
        assert_eq!(registry.symbol_of(conn(2)), Some(Symbol::Second));
        assert_eq!(registry.connections().collect::<Vec<_>>(), vec![conn(2), conn(3)]);
    }

    #[test]
    fn test_freed_second_seat_goes_to_next_admission() {
        let mut registry = SeatRegistry::new();
        registry.admit(conn(1));
        registry.admit(conn(2));
        registry.release(conn(2));
        assert_eq!(registry.admit(conn(3)), Admission::Seated(Symbol::Second));
    }

    #[test]
    fn test_readmit_keeps_symbol() {
        let mut registry = SeatRegistry::new();
        registry.admit(conn(1));
        assert_eq!(registry.admit(conn(1)), Admission::Seated(Symbol::First));
        assert_eq!(registry.occupancy(), 1);
    }
}
