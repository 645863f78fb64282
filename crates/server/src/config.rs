use std::time::Duration;

use serde::{Deserialize, Deserializer};
use transport::{DEFAULT_HOST, DEFAULT_PORT};

/// Default time the network thread sleeps between checks for shutdown
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where and how the control server listens
///
/// Deserialises from JSON such as
/// `{"host": "127.0.0.1", "port": 9000, "pollIntervalMs": 50}`; missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// Address to bind to (defaults to "0.0.0.0")
    pub host: String,

    /// Port to listen on (defaults to 8173)
    pub port: u16,

    /// How often idle accepts and reads check for shutdown
    #[serde(rename = "pollIntervalMs", deserialize_with = "millis")]
    pub poll_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ServerConfig {
    pub fn on_port(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8173);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn builder_helpers() {
        let config = ServerConfig::on_port(9000)
            .with_host("127.0.0.1")
            .with_poll_interval(Duration::from_millis(5));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.poll_interval, Duration::from_millis(5));
    }

    #[test]
    fn deserialise_partial_json() {
        let config: ServerConfig = serde_json::from_str(r#"{"port": 9001}"#).unwrap();
        assert_eq!(config, ServerConfig::on_port(9001));

        let config: ServerConfig =
            serde_json::from_str(r#"{"host": "::1", "pollIntervalMs": 25}"#).unwrap();
        assert_eq!(config.host, "::1");
        assert_eq!(config.port, 8173);
        assert_eq!(config.poll_interval, Duration::from_millis(25));
    }

    #[test]
    fn reject_bad_port() {
        assert!(serde_json::from_str::<ServerConfig>(r#"{"port": 70000}"#).is_err());
    }
}
