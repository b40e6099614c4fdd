pub use huddle_core::{ClientId, RoomCode};

pub mod model {
    pub use huddle_core::model::*;
    pub use huddle_core::ProtocolError;
}

#[cfg(feature = "server")]
pub mod server {
    pub use huddle_server::*;
}
