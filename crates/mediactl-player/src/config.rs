use std::time::Duration;

/// Tunables for one player controller.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Upper bound for a single controller command, including the bridge call
    /// it forwards to.
    pub command_timeout: Duration,
    /// Period of the position poller while playing.
    pub poll_interval: Duration,
    /// Buffered events per subscriber before the slowest one starts lagging.
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(12),
            poll_interval: Duration::from_millis(300),
            event_capacity: 256,
        }
    }
}
