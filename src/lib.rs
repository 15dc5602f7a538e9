//! Vanishing tic-tac-toe - a two-player real-time game server
//!
//! Only the seven most recent stones stay on the board; the eighth move
//! removes the oldest one.
//!
//! # Architecture
//!
//! - **Games**: board state, move queue, and rules
//! - **Session**: seat registry for the two players
//! - **Controller**: the authoritative state machine, emitting wire events
//! - **Hub**: single task that owns the controller and fans out events
//! - **Server**: axum WebSocket transport
//!
//! # Example
//!
//! ```no_run
//! use vanishing_tictactoe::{GameController, GameHub, ServerConfig, serve};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
//! let hub = GameHub::spawn(GameController::new());
//! serve(listener, hub, std::future::pending()).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod controller;
mod games;
mod hub;
mod protocol;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Game controller
pub use controller::{Dispatch, GameController, MoveRejection, PLAYER_LEFT, Phase};

// Crate-level exports - Hub
pub use hub::{GameHub, HubError, HubHandle, HubStatus, Outbound};

// Crate-level exports - Wire protocol
pub use protocol::{BoardSnapshot, Cell, ClientEvent, Placement, RawIndex, ServerEvent, WinReport};

// Crate-level exports - Transport
pub use server::{router, serve};

// Crate-level exports - Session management
pub use session::{Admission, ConnectionId, SEAT_CAPACITY, SeatRegistry};

// Crate-level exports - Game types
pub use games::vanishing::invariants::{
    AlternatingTurnInvariant, BoardInvariants, BoundedQueueInvariant, Invariant, InvariantSet,
    InvariantViolation, QueueMatchesBoardInvariant,
};
pub use games::vanishing::rules::{LINES, is_draw, is_full, winning_line};
pub use games::vanishing::{
    Board, BoardState, MAX_STONES_ON_BOARD, MoveQueue, PlaceError, Position, Square, Symbol,
};
