//! Process configuration, read from flags with environment fallbacks.
use clap::{ArgAction, Parser};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "minesweeper-server", version, about = "Multiplayer minesweeper room server")]
pub struct ServerConfig {
    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Drop a room as soon as its last member leaves.
    #[arg(long, env = "REAP_EMPTY_ROOMS", default_value_t = true, action = ArgAction::Set)]
    pub reap_empty_rooms: bool,

    /// Rooms without any intent for this long are removed by the cleanup task.
    #[arg(long, env = "IDLE_ROOM_TIMEOUT_SECS", default_value_t = 3600)]
    pub idle_room_timeout_secs: u64,

    #[arg(long, env = "CLEANUP_INTERVAL_SECS", default_value_t = 300)]
    pub cleanup_interval_secs: u64,

    /// Minimum gap between two messages from one connection; 0 disables it.
    #[arg(long, env = "MIN_MESSAGE_INTERVAL_MS", default_value_t = 20)]
    pub min_message_interval_ms: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    pub fn registry(&self) -> RegistryConfig {
        RegistryConfig {
            reap_empty_rooms: self.reap_empty_rooms,
            idle_room_timeout: Duration::from_secs(self.idle_room_timeout_secs),
            min_message_interval: Duration::from_millis(self.min_message_interval_ms),
        }
    }
}

/// Knobs consumed by the room registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub reap_empty_rooms: bool,
    pub idle_room_timeout: Duration,
    pub min_message_interval: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            reap_empty_rooms: true,
            idle_room_timeout: Duration::from_secs(3600),
            min_message_interval: Duration::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_minimal_arguments() {
        let config = ServerConfig::try_parse_from(["server", "--min-message-interval-ms", "20"])
            .unwrap();
        assert_eq!(config.registry().min_message_interval, Duration::from_millis(20));
        assert!(config.cleanup_interval() >= Duration::from_secs(1));
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--port",
            "8080",
            "--reap-empty-rooms",
            "false",
            "--idle-room-timeout-secs",
            "60",
        ])
        .unwrap();
        assert_eq!(config.addr().port(), 8080);
        let registry = config.registry();
        assert!(!registry.reap_empty_rooms);
        assert_eq!(registry.idle_room_timeout, Duration::from_secs(60));
    }
}
