use crate::config::HeartbeatConfig;
use tokio::time::Instant;

/// What the connection task should do on a heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Still alive, send the next ping.
    Ping,
    /// Nothing heard back within the timeout.
    Expired,
}

/// Liveness bookkeeping for one connection.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    timeout: std::time::Duration,
    last_seen: Instant,
}

impl Heartbeat {
    pub fn new(config: &HeartbeatConfig, now: Instant) -> Self {
        Self {
            timeout: config.timeout,
            last_seen: now,
        }
    }

    /// Any inbound frame, pongs included, counts as proof of life.
    pub fn on_activity(&mut self, now: Instant) {
        self.last_seen = now;
    }

    pub fn on_tick(&self, now: Instant) -> Probe {
        if now.saturating_duration_since(self.last_seen) > self.timeout {
            Probe::Expired
        } else {
            Probe::Ping
        }
    }
}
