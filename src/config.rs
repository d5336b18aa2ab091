//! Server configuration
//!
//! Command line flags (with `PORT` from the environment) parsed by clap.

use std::time::Duration;

use clap::Parser;

use crate::registry::RECONNECT_WINDOW;

/// Extra delay before a scheduled cleanup re-checks a room
pub const CLEANUP_SLACK: Duration = Duration::from_millis(500);

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// Seconds a disconnected player keeps their seat
    #[arg(long, default_value_t = RECONNECT_WINDOW.as_secs())]
    pub reconnect_window_secs: u64,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn settings(&self) -> ServerSettings {
        ServerSettings {
            reconnect_window: Duration::from_secs(self.reconnect_window_secs),
            cleanup_slack: CLEANUP_SLACK,
        }
    }
}

/// Runtime knobs handed to the `GameServer` actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSettings {
    pub reconnect_window: Duration,
    pub cleanup_slack: Duration,
}

impl ServerSettings {
    /// Delay before a disconnect's cleanup timer fires
    pub fn cleanup_delay(&self) -> Duration {
        self.reconnect_window + self.cleanup_slack
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            reconnect_window: RECONNECT_WINDOW,
            cleanup_slack: CLEANUP_SLACK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_flags() {
        let config = ServerConfig::try_parse_from([
            "zombie_chess_server",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--reconnect-window-secs",
            "5",
        ])
        .unwrap();
        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.settings().reconnect_window, Duration::from_secs(5));
        assert_eq!(
            config.settings().cleanup_delay(),
            Duration::from_millis(5500)
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = ServerSettings::default();
        assert_eq!(settings.reconnect_window, Duration::from_secs(60));
        assert_eq!(settings.cleanup_delay(), Duration::from_millis(60_500));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerConfig::try_parse_from(["zombie_chess_server", "--port", "nope"]).is_err());
    }
}
