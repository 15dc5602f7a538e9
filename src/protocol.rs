//! Wire events exchanged with clients.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`;
//! payload-less events omit `data`.

use crate::games::vanishing::{Board, Position, Symbol};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Events a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Place a stone at a cell.
    Move(RawIndex),
    /// Restart the round.
    RequestReset,
}

impl ClientEvent {
    /// Parses a text frame.
    #[instrument(skip(text), fields(len = text.len()))]
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// A cell index as the client sent it: a number, a numeric string, or junk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawIndex(serde_json::Value);

impl RawIndex {
    /// Wraps a raw JSON value.
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// Coerces the raw value to an integer.
    ///
    /// Integers pass through, finite floats truncate toward zero, and strings
    /// are read by their leading sign and digits after leading whitespace.
    /// Anything else yields `None`.
    pub fn coerce(&self) -> Option<i64> {
        match &self.0 {
            serde_json::Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
            serde_json::Value::String(s) => leading_integer(s),
            _ => None,
        }
    }
}

impl From<i64> for RawIndex {
    fn from(n: i64) -> Self {
        Self(serde_json::Value::from(n))
    }
}

impl From<&str> for RawIndex {
    fn from(s: &str) -> Self {
        Self(serde_json::Value::from(s))
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    rest[..digits_end].parse::<i64>().ok().map(|n| sign * n)
}

/// Board plus the symbol to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    /// Nine cells, row-major.
    pub board: Board,
    /// Symbol to move.
    pub current: Symbol,
}

/// A stone that was just placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    /// Cell index.
    pub index: Position,
    /// Who placed it.
    pub player: Symbol,
}

/// A reference to one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Cell index.
    pub index: Position,
}

/// A completed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinReport {
    /// Symbol that completed the line.
    pub winner: Symbol,
    /// The three cells, in line order.
    pub line: [Position; 3],
}

/// Events the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, strum::IntoStaticStr)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ServerEvent {
    /// Both seats are taken; the connection is about to be closed.
    RoomFull,
    /// Symbol assigned to the receiving connection.
    Assigned(Symbol),
    /// Current board for a newly admitted connection.
    Board(BoardSnapshot),
    /// Symbol to move.
    Turn(Symbol),
    /// A stone was placed.
    Update(Placement),
    /// This cell is the next to vanish.
    MarkOldest(Cell),
    /// No cell is about to vanish.
    ClearMarks,
    /// This cell's stone vanished.
    Remove(Cell),
    /// A line was completed.
    Win(WinReport),
    /// The board filled without a line.
    Draw,
    /// A new round started.
    Reset(BoardSnapshot),
    /// Free-text status.
    System(String),
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Encodes the event as a text frame.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
