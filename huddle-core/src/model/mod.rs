mod client;
mod room;
mod signaling;

pub use client::ClientId;
pub use room::RoomCode;
pub use signaling::{ClientMessage, RelayEnvelope, RelayKind, ServerMessage};
