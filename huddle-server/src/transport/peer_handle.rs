use huddle_core::{ClientId, ServerMessage};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Routing handle for one live connection.
///
/// Sending pushes onto the connection's outbound queue and never waits on the
/// socket; the connection's writer task drains the queue. The registry stores
/// clones of this handle, the socket itself stays owned by the connection task.
#[derive(Debug, Clone)]
pub struct PeerHandle {
    id: ClientId,
    tx: mpsc::UnboundedSender<String>,
}

impl PeerHandle {
    pub fn new(id: ClientId, tx: mpsc::UnboundedSender<String>) -> Self {
        Self { id, tx }
    }

    /// Handle plus the receiving end of its outbound queue.
    pub fn channel(id: ClientId) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    pub fn is_writable(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn send_text(&self, text: String) -> bool {
        if let Err(e) = self.tx.send(text) {
            debug!("Dropping message for closed connection {}: {} bytes", self.id, e.0.len());
            return false;
        }
        true
    }

    pub fn send(&self, msg: &ServerMessage) -> bool {
        match msg.to_text() {
            Ok(json) => self.send_text(json),
            Err(e) => {
                error!("Failed to serialize server message for {}: {}", self.id, e);
                false
            }
        }
    }
}
