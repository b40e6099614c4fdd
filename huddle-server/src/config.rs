use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_MAX_PARTICIPANTS: usize = 8;
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_participants must be at least 1")]
    ZeroCapacity,

    #[error("heartbeat interval must be non-zero")]
    ZeroHeartbeatInterval,

    #[error("heartbeat timeout ({timeout:?}) must not be shorter than the interval ({interval:?})")]
    HeartbeatTimeoutTooShort {
        interval: Duration,
        timeout: Duration,
    },
}

/// Ping cadence and how long a connection may stay silent before it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_HEARTBEAT_INTERVAL,
            timeout: DEFAULT_HEARTBEAT_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// `None` lifts the per-room ceiling.
    pub max_participants: Option<usize>,
    pub heartbeat: HeartbeatConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_participants: Some(DEFAULT_MAX_PARTICIPANTS),
            heartbeat: HeartbeatConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_participants == Some(0) {
            return Err(ConfigError::ZeroCapacity);
        }

        let HeartbeatConfig { interval, timeout } = self.heartbeat;
        if interval.is_zero() {
            return Err(ConfigError::ZeroHeartbeatInterval);
        }
        if timeout < interval {
            return Err(ConfigError::HeartbeatTimeoutTooShort { interval, timeout });
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub relay: RelayConfig,
    /// Accepted authentication tokens. Empty disables the auth gate.
    pub auth_tokens: Vec<String>,
    /// Directory of static client files served under `/`.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            relay: RelayConfig::default(),
            auth_tokens: Vec::new(),
            static_dir: None,
        }
    }
}
