use crate::transport::PeerHandle;
use huddle_core::{ClientId, RoomCode};

/// Protocol state of one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a valid token; only `auth` is processed.
    Unauthenticated,
    Unjoined,
    Joined(RoomCode),
    /// Transport gone. Terminal.
    Closed,
}

/// Per-connection state, owned by the connection task and driven by [`crate::Relay`].
#[derive(Debug)]
pub struct Session {
    pub(crate) handle: PeerHandle,
    pub(crate) state: SessionState,
}

impl Session {
    pub(crate) fn new(handle: PeerHandle, state: SessionState) -> Self {
        Self { handle, state }
    }

    pub fn client_id(&self) -> ClientId {
        self.handle.id()
    }

    pub fn handle(&self) -> &PeerHandle {
        &self.handle
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn room(&self) -> Option<&RoomCode> {
        match &self.state {
            SessionState::Joined(room) => Some(room),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }
}
