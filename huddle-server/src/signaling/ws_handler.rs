use crate::signaling::{Outcome, Relay};
use crate::transport::{Heartbeat, PeerHandle, Probe};
use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use huddle_core::ClientId;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// How long the writer gets to flush queued frames once the reader is done.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Why a connection's read loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disconnect {
    ClientClosed,
    TransportError,
    HeartbeatTimeout,
    AuthRejected,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(relay): State<Relay>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, relay, params.token))
}

async fn handle_socket(socket: WebSocket, relay: Relay, token: Option<String>) {
    let client_id = ClientId::new();
    info!("Client connected: {}", client_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let (control_tx, mut control_rx) = mpsc::unbounded_channel::<Message>();

    let mut session = relay.open_session(PeerHandle::new(client_id, tx));

    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                biased;
                Some(control) = control_rx.recv() => control,
                Some(text) = rx.recv() => Message::Text(text.into()),
                else => break,
            };
            let closing = matches!(msg, Message::Close(_));
            if sender.send(msg).await.is_err() || closing {
                break;
            }
        }
    });

    let mut heartbeat = Heartbeat::new(&relay.config().heartbeat, Instant::now());
    let mut ticker = tokio::time::interval_at(
        Instant::now() + relay.config().heartbeat.interval,
        relay.config().heartbeat.interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let rejected = match token {
        Some(token) if relay.requires_auth() => {
            relay.authenticate(&mut session, &token).await == Outcome::AuthRejected
        }
        _ => false,
    };

    let reason = if rejected {
        Disconnect::AuthRejected
    } else {
        loop {
            tokio::select! {
                frame = receiver.next() => {
                    let msg = match frame {
                        Some(Ok(msg)) => msg,
                        Some(Err(e)) => {
                            warn!("WebSocket error for {}: {}", client_id, e);
                            break Disconnect::TransportError;
                        }
                        None => break Disconnect::ClientClosed,
                    };
                    heartbeat.on_activity(Instant::now());

                    match msg {
                        Message::Text(text) => {
                            if relay.handle_text(&mut session, text.as_str()).await
                                == Outcome::AuthRejected
                            {
                                break Disconnect::AuthRejected;
                            }
                        }
                        Message::Close(_) => break Disconnect::ClientClosed,
                        Message::Binary(data) => {
                            debug!("Ignoring {} byte binary frame from {}", data.len(), client_id);
                        }
                        Message::Ping(_) | Message::Pong(_) => {}
                    }
                }

                _ = &mut send_task => break Disconnect::TransportError,

                _ = ticker.tick() => match heartbeat.on_tick(Instant::now()) {
                    Probe::Ping => {
                        let _ = control_tx.send(Message::Ping(Bytes::new()));
                    }
                    Probe::Expired => {
                        info!("Heartbeat timeout for {}", client_id);
                        break Disconnect::HeartbeatTimeout;
                    }
                },
            }
        }
    };

    relay.close(&mut session);

    let frame = match reason {
        Disconnect::AuthRejected => Some(CloseFrame {
            code: close_code::POLICY,
            reason: Utf8Bytes::from_static("authentication failed"),
        }),
        Disconnect::HeartbeatTimeout => Some(CloseFrame {
            code: close_code::AWAY,
            reason: Utf8Bytes::from_static("heartbeat timeout"),
        }),
        Disconnect::ClientClosed | Disconnect::TransportError => None,
    };
    if reason != Disconnect::TransportError {
        let _ = control_tx.send(Message::Close(frame));
    }
    drop(control_tx);
    drop(session);

    if !send_task.is_finished()
        && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut send_task)
            .await
            .is_err()
    {
        send_task.abort();
    }

    info!("Client disconnected: {} ({:?})", client_id, reason);
}
