//! Client configuration

use std::env;
use std::time::Duration;

/// Runtime configuration of the chat client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address of the backing store, `host:port`
    pub store_addr: String,

    /// Total elapsed-time budget of one read call. The window is fixed at
    /// loop entry; receiving messages does not extend it.
    pub read_timeout: Duration,

    /// Yield between empty polls of the read loop
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_addr: "127.0.0.1:6379".to_string(),
            read_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1),
        }
    }
}

impl Config {
    /// Build a configuration from the environment, falling back to the
    /// defaults field by field:
    ///
    /// - `FERROCHAT_STORE_ADDR`
    /// - `FERROCHAT_READ_TIMEOUT_SECS`
    /// - `FERROCHAT_POLL_INTERVAL_MS`
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            store_addr: env::var("FERROCHAT_STORE_ADDR").unwrap_or(defaults.store_addr),
            read_timeout: env::var("FERROCHAT_READ_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.read_timeout),
            poll_interval: env::var("FERROCHAT_POLL_INTERVAL_MS")
                .ok()
                .and_then(|value| value.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store_addr, "127.0.0.1:6379");
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
    }
}
