//! WebSocket transport for the game hub.

use crate::hub::{HubHandle, Outbound};
use crate::protocol::ClientEvent;
use axum::body::Body;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// Builds the HTTP routes.
///
/// - `GET /ws` upgrades to the game socket
/// - `GET /health` answers `ok`
/// - `GET /status` reports the session summary as JSON
pub fn router(hub: HubHandle) -> Router {
    Router::new()
        .route("/ws", get(upgrade))
        .route("/health", get(health))
        .route("/status", get(status))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(hub)
}

/// Serves `router` on `listener` until `shutdown` resolves.
#[instrument(skip_all)]
pub async fn serve<F>(listener: TcpListener, hub: HubHandle, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "Listening on ws://{}/ws", addr);
    }
    axum::serve(listener, router(hub))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> &'static str {
    "ok"
}

async fn status(State(hub): State<HubHandle>) -> Response {
    match hub.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!(error = %e, "Status unavailable");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn upgrade(ws: WebSocketUpgrade, State(hub): State<HubHandle>) -> Response {
    ws.on_upgrade(move |socket| pump(socket, hub))
}

/// Moves frames between one socket and the hub until either side ends.
async fn pump(socket: WebSocket, hub: HubHandle) {
    let (connection, mut inbox) = match hub.connect() {
        Ok(registered) => registered,
        Err(e) => {
            warn!(error = %e, "Could not register connection");
            return;
        }
    };
    info!(%connection, "Socket opened");

    let (mut sink, mut stream) = socket.split();

    let mut writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            match message {
                Outbound::Event(event) => {
                    let text = match event.to_json() {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(%connection, error = %e, "Failed to encode event");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    // The writer stops after a close it was told to send; the socket goes with it.
    let mut writer_done = false;
    loop {
        let frame = tokio::select! {
            frame = stream.next() => frame,
            _ = &mut writer => {
                debug!(%connection, "Writer finished, dropping socket");
                writer_done = true;
                break;
            }
        };
        match frame {
            Some(Ok(Message::Text(text))) => match ClientEvent::from_json(text.as_str()) {
                Ok(event) => {
                    if hub.send(connection, event).is_err() {
                        break;
                    }
                }
                Err(e) => debug!(%connection, error = %e, "Dropping malformed frame"),
            },
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(%connection, error = %e, "Socket error");
                break;
            }
        }
    }
    drop(stream);

    if let Err(e) = hub.disconnect(connection) {
        warn!(%connection, error = %e, "Could not report disconnect");
    }
    if !writer_done {
        let _ = writer.await;
    }
    info!(%connection, "Socket closed");
}
