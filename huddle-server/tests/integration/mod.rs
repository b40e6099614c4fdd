pub mod connection_tests;
pub mod messaging_tests;

use std::time::Duration;

use huddle_server::{HeartbeatConfig, Relay, RelayConfig, RoomRegistry, ServerConfig};
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_relay(max_participants: Option<usize>) -> Relay {
    Relay::new(
        RoomRegistry::new(),
        RelayConfig {
            max_participants,
            ..RelayConfig::default()
        },
    )
}

/// Server config with a heartbeat fast enough to observe in a test.
pub fn fast_heartbeat_config() -> ServerConfig {
    ServerConfig {
        relay: RelayConfig {
            heartbeat: HeartbeatConfig {
                interval: Duration::from_millis(100),
                timeout: Duration::from_millis(250),
            },
            ..RelayConfig::default()
        },
        ..ServerConfig::default()
    }
}
