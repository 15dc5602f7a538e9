//! Single-writer task that owns the game session.
//!
//! Connection pumps talk to the hub over one channel. The hub applies each
//! command to the controller and enqueues every resulting message before it
//! reads the next command, so all clients see events in handler order.

use crate::controller::{Dispatch, GameController, Phase};
use crate::games::vanishing::Symbol;
use crate::protocol::{ClientEvent, ServerEvent};
use crate::session::ConnectionId;
use derive_more::{Display, Error};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// A message for one connection's socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Send this event.
    Event(ServerEvent),
    /// Close the socket.
    Close,
}

/// Session summary for health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubStatus {
    /// Lifecycle phase.
    pub phase: Phase,
    /// Seated connections.
    pub occupancy: usize,
    /// Symbol to move.
    pub current: Symbol,
    /// Stones on the board.
    pub stones: usize,
}

/// The hub task has stopped.
#[derive(Debug, Clone, Display, Error)]
#[display("Hub error: {} at {}:{}", message, file, line)]
pub struct HubError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl HubError {
    /// Creates a new hub error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[derive(Debug)]
enum HubCommand {
    Connect {
        connection: ConnectionId,
        outbox: mpsc::UnboundedSender<Outbound>,
    },
    Client {
        connection: ConnectionId,
        event: ClientEvent,
    },
    Disconnect {
        connection: ConnectionId,
    },
    Status {
        reply: oneshot::Sender<HubStatus>,
    },
}

/// Cloneable handle for submitting events to the hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<HubCommand>,
    next_id: Arc<AtomicU64>,
}

impl HubHandle {
    /// Registers a new connection and returns its id and outbox.
    #[instrument(skip(self))]
    pub fn connect(&self) -> Result<(ConnectionId, mpsc::UnboundedReceiver<Outbound>), HubError> {
        let connection = ConnectionId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (outbox, inbox) = mpsc::unbounded_channel();
        self.submit(HubCommand::Connect { connection, outbox })?;
        Ok((connection, inbox))
    }

    /// Forwards a client event.
    pub fn send(&self, connection: ConnectionId, event: ClientEvent) -> Result<(), HubError> {
        self.submit(HubCommand::Client { connection, event })
    }

    /// Reports that a connection is gone.
    #[instrument(skip(self))]
    pub fn disconnect(&self, connection: ConnectionId) -> Result<(), HubError> {
        self.submit(HubCommand::Disconnect { connection })
    }

    /// Fetches a session summary.
    pub async fn status(&self) -> Result<HubStatus, HubError> {
        let (reply, response) = oneshot::channel();
        self.submit(HubCommand::Status { reply })?;
        response
            .await
            .map_err(|_| HubError::new("Hub dropped status request"))
    }

    fn submit(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands
            .send(command)
            .map_err(|_| HubError::new("Hub task is not running"))
    }
}

/// Owner of the `GameController` and of every connection's outbox.
pub struct GameHub {
    controller: GameController,
    outboxes: HashMap<ConnectionId, mpsc::UnboundedSender<Outbound>>,
    commands: mpsc::UnboundedReceiver<HubCommand>,
}

impl GameHub {
    /// Starts the hub on the current tokio runtime.
    #[instrument(skip(controller))]
    pub fn spawn(controller: GameController) -> HubHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            controller,
            outboxes: HashMap::new(),
            commands: rx,
        };
        tokio::spawn(hub.run());
        info!("Game hub started");
        HubHandle {
            commands: tx,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }
        info!("All hub handles dropped, stopping");
    }

    fn apply(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { connection, outbox } => {
                self.outboxes.insert(connection, outbox);
                let out = self.controller.on_connect(connection);
                self.deliver(out);
            }
            HubCommand::Client { connection, event } => {
                if !self.outboxes.contains_key(&connection) {
                    debug!(%connection, "Ignoring event from closed connection");
                    return;
                }
                let out = self.controller.handle(connection, event);
                self.deliver(out);
            }
            HubCommand::Disconnect { connection } => {
                // Rejected connections were already dropped on close.
                if self.outboxes.remove(&connection).is_none() {
                    debug!(%connection, "Disconnect from unseated connection");
                    return;
                }
                let out = self.controller.on_disconnect(connection);
                self.deliver(out);
            }
            HubCommand::Status { reply } => {
                let status = HubStatus {
                    phase: self.controller.phase(),
                    occupancy: self.controller.registry().occupancy(),
                    current: self.controller.current_turn(),
                    stones: self.controller.move_queue().len(),
                };
                let _ = reply.send(status);
            }
        }
    }

    fn deliver(&mut self, dispatches: Vec<Dispatch>) {
        for dispatch in dispatches {
            match dispatch {
                Dispatch::Broadcast(event) => {
                    let recipients: Vec<_> = self.controller.registry().connections().collect();
                    debug!(event = event.name(), recipients = recipients.len(), "Broadcast");
                    for connection in recipients {
                        self.push(connection, Outbound::Event(event.clone()));
                    }
                }
                Dispatch::Unicast(connection, event) => {
                    debug!(%connection, event = event.name(), "Unicast");
                    self.push(connection, Outbound::Event(event));
                }
                Dispatch::Close(connection) => {
                    self.push(connection, Outbound::Close);
                    self.outboxes.remove(&connection);
                }
            }
        }
    }

    fn push(&self, connection: ConnectionId, message: Outbound) {
        match self.outboxes.get(&connection) {
            Some(outbox) => {
                if outbox.send(message).is_err() {
                    warn!(%connection, "Outbox closed, message dropped");
                }
            }
            None => warn!(%connection, "No outbox for connection"),
        }
    }
}
