mod config;
mod room;
mod signaling;
mod transport;

pub use config::*;
pub use room::*;
pub use signaling::*;
pub use transport::*;

use axum::Router;
use std::sync::Arc;

/// Builds the relay described by `config` and the router serving it.
pub fn app(config: &ServerConfig) -> Result<(Relay, Router), ConfigError> {
    config.relay.validate()?;

    let mut relay = Relay::new(RoomRegistry::new(), config.relay.clone());
    if !config.auth_tokens.is_empty() {
        relay = relay.with_authenticator(Arc::new(StaticTokens::new(
            config.auth_tokens.iter().cloned(),
        )));
    }

    let router = router(relay.clone(), config.static_dir.clone());
    Ok((relay, router))
}
