use crate::config::RelayConfig;
use crate::room::{RegistryError, RoomRegistry};
use crate::signaling::{Authenticator, Session, SessionState};
use crate::transport::PeerHandle;
use huddle_core::{ClientId, ClientMessage, RelayEnvelope, RelayKind, RoomCode, ServerMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Why an inbound message had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Malformed,
    NotAuthenticated,
    AlreadyAuthenticated,
    NotJoined,
    RoomMismatch,
    TargetAbsent,
    TargetUnwritable,
    SendFailed,
    SessionClosed,
}

/// What handling one inbound message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Authenticated,
    AuthRejected,
    Joined {
        room: RoomCode,
        participants: Vec<ClientId>,
        rejoined: bool,
    },
    RoomFull {
        room: RoomCode,
        capacity: usize,
    },
    Forwarded {
        kind: RelayKind,
        target: ClientId,
    },
    Left {
        room: RoomCode,
    },
    Dropped(DropReason),
}

/// Drives every connection's [`Session`] against the shared [`RoomRegistry`].
#[derive(Clone)]
pub struct Relay {
    registry: RoomRegistry,
    config: Arc<RelayConfig>,
    authenticator: Option<Arc<dyn Authenticator>>,
}

impl Relay {
    pub fn new(registry: RoomRegistry, config: RelayConfig) -> Self {
        Self {
            registry,
            config: Arc::new(config),
            authenticator: None,
        }
    }

    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn requires_auth(&self) -> bool {
        self.authenticator.is_some()
    }

    pub fn open_session(&self, handle: PeerHandle) -> Session {
        let state = if self.requires_auth() {
            SessionState::Unauthenticated
        } else {
            SessionState::Unjoined
        };
        Session::new(handle, state)
    }

    /// Parses and dispatches one text frame. Malformed frames are logged and dropped.
    pub async fn handle_text(&self, session: &mut Session, text: &str) -> Outcome {
        match ClientMessage::parse(text) {
            Ok(msg) => self.dispatch(session, msg).await,
            Err(e) => {
                warn!("Invalid message from {}: {}", session.client_id(), e);
                Outcome::Dropped(DropReason::Malformed)
            }
        }
    }

    pub async fn dispatch(&self, session: &mut Session, msg: ClientMessage) -> Outcome {
        if session.is_closed() {
            debug!(
                "Ignoring {} from closed session {}",
                msg.type_name(),
                session.client_id()
            );
            return Outcome::Dropped(DropReason::SessionClosed);
        }

        match msg {
            ClientMessage::Auth { token } => self.authenticate(session, &token).await,
            msg if session.state == SessionState::Unauthenticated => {
                debug!(
                    "Ignoring {} from unauthenticated {}",
                    msg.type_name(),
                    session.client_id()
                );
                Outcome::Dropped(DropReason::NotAuthenticated)
            }
            ClientMessage::Join { room } => self.join(session, room),
            ClientMessage::Relay(envelope) => self.forward(session, envelope),
            ClientMessage::Leave { room } => self.leave(session, room),
        }
    }

    pub async fn authenticate(&self, session: &mut Session, token: &str) -> Outcome {
        if session.state != SessionState::Unauthenticated {
            debug!("Ignoring repeated auth from {}", session.client_id());
            return Outcome::Dropped(DropReason::AlreadyAuthenticated);
        }

        let accepted = match &self.authenticator {
            Some(authenticator) => authenticator.verify(token).await,
            None => true,
        };

        if !accepted {
            warn!("Rejected authentication for {}", session.client_id());
            return Outcome::AuthRejected;
        }

        session.state = SessionState::Unjoined;
        session.handle.send(&ServerMessage::Authenticated {
            client_id: session.client_id(),
        });
        info!("Client {} authenticated", session.client_id());
        Outcome::Authenticated
    }

    /// Joins `room`. A session already in another room is admitted to the new
    /// one first and only then leaves the old one, so a refused switch keeps
    /// its current membership.
    fn join(&self, session: &mut Session, room: RoomCode) -> Outcome {
        let client_id = session.client_id();
        let admission = match self.registry.join(
            &room,
            session.handle.clone(),
            self.config.max_participants,
        ) {
            Ok(admission) => admission,
            Err(RegistryError::RoomFull { room, capacity }) => {
                warn!(
                    "Client {} refused: room {} is full ({})",
                    client_id, room, capacity
                );
                session.handle.send(&ServerMessage::RoomFull {
                    room_id: room.clone(),
                    capacity,
                });
                return Outcome::RoomFull { room, capacity };
            }
        };

        let participants = admission.participants();
        let rejoined = admission.rejoined();
        let created = admission.created();
        let member_count = admission.member_count();

        session.handle.send(&ServerMessage::Joined {
            room_id: room.clone(),
            client_id,
            participants: participants.clone(),
        });
        if !rejoined {
            notify(admission.others(), &ServerMessage::PeerJoined { client_id });
        }
        drop(admission);

        if created {
            info!("Created room {}", room);
        }
        info!(
            "Client {} joined room {}. Total participants: {}",
            client_id, room, member_count
        );

        if session.room().is_some_and(|current| *current != room) {
            self.leave_current(session);
        }
        session.state = SessionState::Joined(room.clone());

        Outcome::Joined {
            room,
            participants,
            rejoined,
        }
    }

    fn forward(&self, session: &Session, envelope: RelayEnvelope) -> Outcome {
        let Some(room) = session.room() else {
            debug!(
                "Dropping {} from {}: not in a room",
                envelope.kind().as_str(),
                session.client_id()
            );
            return Outcome::Dropped(DropReason::NotJoined);
        };

        let kind = envelope.kind();
        let target = envelope.target();

        let Some(peer) = self.registry.route(room, &target) else {
            debug!(
                "Dropping {} from {}: {} is not in room {}",
                kind.as_str(),
                session.client_id(),
                target,
                room
            );
            return Outcome::Dropped(DropReason::TargetAbsent);
        };

        if !peer.is_writable() {
            debug!("Dropping {} to {}: connection closing", kind.as_str(), target);
            return Outcome::Dropped(DropReason::TargetUnwritable);
        }

        let text = match envelope.into_stamped_text(session.client_id()) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to serialize {} for {}: {}", kind.as_str(), target, e);
                return Outcome::Dropped(DropReason::SendFailed);
            }
        };

        if !peer.send_text(text) {
            return Outcome::Dropped(DropReason::SendFailed);
        }

        debug!(
            "Relayed {} from {} to {}",
            kind.as_str(),
            session.client_id(),
            target
        );
        Outcome::Forwarded { kind, target }
    }

    fn leave(&self, session: &mut Session, room: RoomCode) -> Outcome {
        match session.room() {
            Some(current) if *current == room => {}
            Some(current) => {
                debug!(
                    "Ignoring leave of {} from {}: currently in {}",
                    room,
                    session.client_id(),
                    current
                );
                return Outcome::Dropped(DropReason::RoomMismatch);
            }
            None => return Outcome::Dropped(DropReason::NotJoined),
        }

        self.leave_current(session);
        Outcome::Left { room }
    }

    /// Moves the session to `Closed`, leaving its room first. Safe to call more
    /// than once; only the first call can emit `peer-left`.
    pub fn close(&self, session: &mut Session) {
        if session.is_closed() {
            return;
        }
        self.leave_current(session);
        session.state = SessionState::Closed;
    }

    fn leave_current(&self, session: &mut Session) -> Option<RoomCode> {
        let SessionState::Joined(room) = &session.state else {
            return None;
        };
        let room = room.clone();
        session.state = SessionState::Unjoined;

        let client_id = session.client_id();
        let departure = self.registry.leave(&room, &client_id);
        let was_member = departure.was_member();
        let room_deleted = departure.room_deleted();
        if was_member {
            notify(departure.remaining(), &ServerMessage::PeerLeft { client_id });
        }
        drop(departure);

        if was_member {
            info!("Client {} left room {}", client_id, room);
        }
        if room_deleted {
            info!("Room {} deleted (empty)", room);
        }

        Some(room)
    }
}

fn notify<'a>(peers: impl Iterator<Item = &'a PeerHandle>, msg: &ServerMessage) {
    let text = match msg.to_text() {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to serialize server message: {}", e);
            return;
        }
    };

    for peer in peers.filter(|peer| peer.is_writable()) {
        peer.send_text(text.clone());
    }
}
