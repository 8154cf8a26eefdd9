use std::path::PathBuf;
use std::time::Duration;

use quizroom::{ChannelConfig, DEFAULT_ENDPOINT};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub event_capacity: usize,
    pub shutdown_timeout_ms: u64,
    pub log_file: Option<PathBuf>,
    pub player_name: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let channel = ChannelConfig::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            event_capacity: channel.event_capacity,
            shutdown_timeout_ms: channel.shutdown_timeout.as_millis() as u64,
            log_file: None,
            player_name: None,
        }
    }
}

impl ClientConfig {
    pub fn channel(&self) -> ChannelConfig {
        ChannelConfig {
            event_capacity: self.event_capacity.max(1),
            shutdown_timeout: Duration::from_millis(self.shutdown_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_channel() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, "ws://localhost:8080/ws");
        assert_eq!(config.channel(), ChannelConfig::default());
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let config = ClientConfig {
            event_capacity: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.channel().event_capacity, 1);
    }
}
