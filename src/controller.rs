//! Authoritative state machine for the game session.
//!
//! The controller owns the seat registry and the board state. Each handler
//! runs to completion and returns the messages it produced, in emission
//! order; the caller delivers them before handing over the next event.

use crate::games::vanishing::invariants;
use crate::games::vanishing::rules;
use crate::games::vanishing::{BoardState, MoveQueue, Position, Symbol};
use crate::protocol::{BoardSnapshot, Cell, ClientEvent, Placement, RawIndex, ServerEvent, WinReport};
use crate::session::{Admission, ConnectionId, SEAT_CAPACITY, SeatRegistry};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Status text broadcast when a seated connection leaves.
pub const PLAYER_LEFT: &str = "player left";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum Phase {
    /// Fewer than two seats are filled.
    WaitingForPlayers,
    /// Both seats are filled.
    InProgress,
    /// A win or draw was just detected and the round is being reset.
    RoundEnding,
}

/// A message produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Send to every seated connection.
    Broadcast(ServerEvent),
    /// Send to one connection only.
    Unicast(ConnectionId, ServerEvent),
    /// Close the connection after everything queued for it is sent.
    Close(ConnectionId),
}

/// Why a move was dropped. Never reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveRejection {
    /// The index could not be read as an integer.
    #[display("Index is not a number")]
    Unparseable,
    /// The index is outside 0-8.
    #[display("Index {} is out of range", _0)]
    OutOfRange(i64),
    /// The sender holds no seat.
    #[display("Sender is not seated")]
    Unseated,
    /// The sender's symbol is not the one to move.
    #[display("It is {}'s turn", _0)]
    NotYourTurn(Symbol),
    /// The cell already holds a stone.
    #[display("Square {} is already occupied", _0)]
    Occupied(Position),
}

impl std::error::Error for MoveRejection {}

/// The single game session.
#[derive(Debug, Clone)]
pub struct GameController {
    registry: SeatRegistry,
    state: BoardState,
    phase: Phase,
}

impl GameController {
    /// Creates a session with no seats taken and an empty board.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating game session");
        Self {
            registry: SeatRegistry::new(),
            state: BoardState::new(),
            phase: Phase::WaitingForPlayers,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Seat registry.
    pub fn registry(&self) -> &SeatRegistry {
        &self.registry
    }

    /// Board and move queue.
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Cells in placement order, oldest first.
    pub fn move_queue(&self) -> &MoveQueue {
        self.state.queue()
    }

    /// Symbol to move.
    pub fn current_turn(&self) -> Symbol {
        self.state.current_turn()
    }

    /// Board plus the symbol to move.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.state.board().clone(),
            current: self.state.current_turn(),
        }
    }

    /// Routes a client event to its handler.
    pub fn handle(&mut self, connection: ConnectionId, event: ClientEvent) -> Vec<Dispatch> {
        match event {
            ClientEvent::Move(raw) => self.on_move(connection, &raw),
            ClientEvent::RequestReset => self.on_reset_request(connection),
        }
    }

    /// A connection arrived.
    ///
    /// Seated connections get their symbol and the board; a full room gets
    /// `roomFull` and is closed. Filling the second seat announces the turn.
    #[instrument(skip(self), fields(occupancy = self.registry.occupancy()))]
    pub fn on_connect(&mut self, connection: ConnectionId) -> Vec<Dispatch> {
        let symbol = match self.registry.admit(connection) {
            Admission::Seated(symbol) => symbol,
            Admission::Rejected => {
                return vec![
                    Dispatch::Unicast(connection, ServerEvent::RoomFull),
                    Dispatch::Close(connection),
                ];
            }
        };

        let mut out = vec![
            Dispatch::Unicast(connection, ServerEvent::Assigned(symbol)),
            Dispatch::Unicast(connection, ServerEvent::Board(self.snapshot())),
        ];
        if self.registry.occupancy() == SEAT_CAPACITY {
            out.push(Dispatch::Broadcast(ServerEvent::Turn(self.current_turn())));
        }
        self.settle_phase();
        out
    }

    /// A connection asked to place a stone.
    ///
    /// Invalid moves are dropped without any message.
    #[instrument(skip(self, raw), fields(raw = ?raw))]
    pub fn on_move(&mut self, connection: ConnectionId, raw: &RawIndex) -> Vec<Dispatch> {
        let (pos, symbol) = match self.validate_move(connection, raw) {
            Ok(accepted) => accepted,
            Err(rejection) => {
                debug!(%connection, %rejection, "Dropping move");
                return Vec::new();
            }
        };

        if let Err(e) = self.state.place(pos, symbol) {
            debug!(%connection, error = %e, "Dropping move");
            return Vec::new();
        }
        debug!(%connection, %symbol, index = pos.to_index(), "Stone placed");

        let mut out = vec![
            Dispatch::Broadcast(ServerEvent::Update(Placement {
                index: pos,
                player: symbol,
            })),
            Dispatch::Broadcast(self.marking()),
        ];

        if let Some(evicted) = self.state.evict_oldest_if_over_capacity() {
            out.push(Dispatch::Broadcast(ServerEvent::Remove(Cell { index: evicted })));
            out.push(Dispatch::Broadcast(self.marking()));
        }

        if let Some(line) = rules::winning_line(self.state.board()) {
            // Eviction only clears cells, so a fresh line is the mover's.
            let winner = self.state.board().get(line[0]).symbol().unwrap_or(symbol);
            self.set_phase(Phase::RoundEnding);
            info!(%winner, ?line, board = %self.state.board().display(), "Line completed");
            out.push(Dispatch::Broadcast(ServerEvent::Win(WinReport { winner, line })));
            self.reset_round(&mut out);
        } else if rules::is_draw(self.state.board()) {
            self.set_phase(Phase::RoundEnding);
            info!(board = %self.state.board().display(), "Board full, round drawn");
            out.push(Dispatch::Broadcast(ServerEvent::Draw));
            self.reset_round(&mut out);
        } else {
            self.state.flip_turn();
            out.push(Dispatch::Broadcast(ServerEvent::Turn(self.current_turn())));
        }

        self.settle_phase();
        out
    }

    /// Anyone may restart the round at any time.
    #[instrument(skip(self))]
    pub fn on_reset_request(&mut self, connection: ConnectionId) -> Vec<Dispatch> {
        info!(%connection, "Reset requested");
        let mut out = Vec::new();
        self.reset_round(&mut out);
        self.settle_phase();
        out
    }

    /// A connection went away; its seat frees and the round restarts.
    #[instrument(skip(self))]
    pub fn on_disconnect(&mut self, connection: ConnectionId) -> Vec<Dispatch> {
        self.registry.release(connection);
        let mut out = vec![Dispatch::Broadcast(ServerEvent::System(PLAYER_LEFT.to_string()))];
        self.reset_round(&mut out);
        self.settle_phase();
        out
    }

    fn validate_move(
        &self,
        connection: ConnectionId,
        raw: &RawIndex,
    ) -> Result<(Position, Symbol), MoveRejection> {
        let index = raw.coerce().ok_or(MoveRejection::Unparseable)?;
        let pos = Position::from_signed(index).ok_or(MoveRejection::OutOfRange(index))?;
        let symbol = self
            .registry
            .symbol_of(connection)
            .ok_or(MoveRejection::Unseated)?;
        let current = self.current_turn();
        if symbol != current {
            return Err(MoveRejection::NotYourTurn(current));
        }
        if !self.state.board().is_empty(pos) {
            return Err(MoveRejection::Occupied(pos));
        }
        Ok((pos, symbol))
    }

    /// `markOldest` for the next cell to vanish, or `clearMarks`.
    fn marking(&self) -> ServerEvent {
        match self.state.peek_oldest_if_at_capacity() {
            Some(index) => ServerEvent::MarkOldest(Cell { index }),
            None => ServerEvent::ClearMarks,
        }
    }

    fn reset_round(&mut self, out: &mut Vec<Dispatch>) {
        self.state.reset();
        info!("Round reset");
        out.push(Dispatch::Broadcast(ServerEvent::ClearMarks));
        out.push(Dispatch::Broadcast(ServerEvent::Reset(self.snapshot())));
    }

    fn settle_phase(&mut self) {
        let phase = if self.registry.occupancy() == SEAT_CAPACITY {
            Phase::InProgress
        } else {
            Phase::WaitingForPlayers
        };
        self.set_phase(phase);
        debug_assert!(
            invariants::check_board(&self.state).is_ok(),
            "board invariants violated: {:?}",
            invariants::check_board(&self.state)
        );
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            info!(from = %self.phase, to = %phase, "Phase transition");
            self.phase = phase;
        }
    }
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(n: u64) -> ConnectionId {
        ConnectionId::from(n)
    }

    fn seated_pair() -> GameController {
        let mut controller = GameController::new();
        controller.on_connect(conn(1));
        controller.on_connect(conn(2));
        controller
    }

    #[test]
    fn test_first_connection_waits() {
        let mut controller = GameController::new();
        let out = controller.on_connect(conn(1));
        assert_eq!(
            out,
            vec![
                Dispatch::Unicast(conn(1), ServerEvent::Assigned(Symbol::First)),
                Dispatch::Unicast(conn(1), ServerEvent::Board(controller.snapshot())),
            ]
        );
        assert_eq!(controller.phase(), Phase::WaitingForPlayers);
    }

    #[test]
    fn test_second_connection_starts_play() {
        let mut controller = GameController::new();
        controller.on_connect(conn(1));
        let out = controller.on_connect(conn(2));
        assert_eq!(out[0], Dispatch::Unicast(conn(2), ServerEvent::Assigned(Symbol::Second)));
        assert_eq!(out[2], Dispatch::Broadcast(ServerEvent::Turn(Symbol::First)));
        assert_eq!(controller.phase(), Phase::InProgress);
    }

    #[test]
    fn test_room_full_closes_connection() {
        let mut controller = seated_pair();
        let out = controller.on_connect(conn(3));
        assert_eq!(
            out,
            vec![
                Dispatch::Unicast(conn(3), ServerEvent::RoomFull),
                Dispatch::Close(conn(3)),
            ]
        );
        assert_eq!(controller.registry().occupancy(), 2);
    }

    #[test]
    fn test_rejections_are_silent() {
        let mut controller = seated_pair();
        assert!(controller.on_move(conn(2), &RawIndex::from(4)).is_empty());
        assert!(controller.on_move(conn(3), &RawIndex::from(4)).is_empty());
        assert!(controller.on_move(conn(1), &RawIndex::from(9)).is_empty());
        assert!(controller.on_move(conn(1), &RawIndex::from("x")).is_empty());
        assert!(!controller.on_move(conn(1), &RawIndex::from(4)).is_empty());
        assert!(controller.on_move(conn(2), &RawIndex::from(4)).is_empty());
        assert_eq!(controller.current_turn(), Symbol::Second);
        assert_eq!(controller.move_queue().len(), 1);
    }

    #[test]
    fn test_validate_reports_reason() {
        let controller = seated_pair();
        assert_eq!(
            controller.validate_move(conn(1), &RawIndex::from(-3)),
            Err(MoveRejection::OutOfRange(-3))
        );
        assert_eq!(
            controller.validate_move(conn(2), &RawIndex::from(0)),
            Err(MoveRejection::NotYourTurn(Symbol::First))
        );
        assert_eq!(
            controller.validate_move(conn(7), &RawIndex::from(0)),
            Err(MoveRejection::Unseated)
        );
    }

    #[test]
    fn test_reset_request_from_anyone() {
        let mut controller = seated_pair();
        controller.on_move(conn(1), &RawIndex::from(0));
        let out = controller.on_reset_request(conn(42));
        assert_eq!(
            out,
            vec![
                Dispatch::Broadcast(ServerEvent::ClearMarks),
                Dispatch::Broadcast(ServerEvent::Reset(BoardSnapshot {
                    board: crate::games::vanishing::Board::new(),
                    current: Symbol::First,
                })),
            ]
        );
        assert!(controller.move_queue().is_empty());
        assert_eq!(controller.registry().occupancy(), 2);
    }

    #[test]
    fn test_disconnect_frees_seat_and_resets() {
        let mut controller = seated_pair();
        controller.on_move(conn(1), &RawIndex::from(0));
        let out = controller.on_disconnect(conn(1));
        assert_eq!(out[0], Dispatch::Broadcast(ServerEvent::System(PLAYER_LEFT.to_string())));
        assert_eq!(out.len(), 3);
        assert_eq!(controller.phase(), Phase::WaitingForPlayers);
        assert!(controller.state().board().is_empty(Position::TopLeft));
    }
}
