mod heartbeat;
mod peer_handle;

pub use heartbeat::*;
pub use peer_handle::*;
