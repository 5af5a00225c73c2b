//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key is optional; invalid values
//! fall back to their defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `PORT` | `3000` |
//! | `WFL_BIND_HOST` | `127.0.0.1` |
//! | `WFL_CONTROL_TOKEN` | empty (open mode) |
//! | `WFL_HEARTBEAT_INTERVAL_MS` | `30000` |
//! | `WFL_CLASSIFY_GRACE_MS` | `1000` |
//! | `WFL_OUTBOUND_CAPACITY` | `256` |
//! | `WFL_SHUTDOWN_TIMEOUT_MS` | `2000` |
//! | `WFL_LOG_FORMAT` | `text` |

use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Listening port.
    pub port: u16,

    /// Host or address to bind.
    pub bind_host: String,

    /// Shared control secret. Empty means every request is authorized.
    pub control_token: String,

    /// Period of the heartbeat sweep.
    pub heartbeat_interval: Duration,

    /// How long a new connection may stay unclassified before it becomes
    /// an observer.
    pub classify_grace: Duration,

    /// Capacity of each connection's outbound queue.
    pub outbound_capacity: usize,

    /// How long shutdown waits for running sequences.
    pub shutdown_timeout: Duration,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            bind_host: "127.0.0.1".to_string(),
            control_token: String::new(),
            heartbeat_interval: Duration::from_millis(30_000),
            classify_grace: Duration::from_millis(1_000),
            outbound_capacity: 256,
            shutdown_timeout: Duration::from_millis(2_000),
            log_format: LogFormat::Text,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let parse_ms = |key: &str, default: Duration| {
            Duration::from_millis(parse_env(&lookup, key, duration_ms(default)))
        };

        Self {
            port: parse_env(&lookup, "PORT", defaults.port),
            bind_host: lookup("WFL_BIND_HOST")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.bind_host),
            control_token: lookup("WFL_CONTROL_TOKEN")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            heartbeat_interval: parse_ms("WFL_HEARTBEAT_INTERVAL_MS", defaults.heartbeat_interval),
            classify_grace: parse_ms("WFL_CLASSIFY_GRACE_MS", defaults.classify_grace),
            outbound_capacity: parse_env(&lookup, "WFL_OUTBOUND_CAPACITY", defaults.outbound_capacity)
                .max(1),
            shutdown_timeout: parse_ms("WFL_SHUTDOWN_TIMEOUT_MS", defaults.shutdown_timeout),
            log_format: match lookup("WFL_LOG_FORMAT").as_deref().map(str::trim) {
                Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
        }
    }

    /// `host:port` string to bind the listener to.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            format!("[{}]:{}", self.bind_host, self.port)
        } else {
            format!("{}:{}", self.bind_host, self.port)
        }
    }

    /// Returns `true` when the bind host only accepts local connections.
    #[must_use]
    pub fn is_local_bind(&self) -> bool {
        matches!(
            self.bind_host.trim_matches(['[', ']']),
            "127.0.0.1" | "localhost" | "::1"
        )
    }

    /// Returns `true` when a control token is configured.
    #[must_use]
    pub fn auth_enabled(&self) -> bool {
        !self.control_token.is_empty()
    }

    /// Returns `true` when control endpoints are exposed to the network
    /// without a token.
    #[must_use]
    pub fn is_exposed(&self) -> bool {
        !self.auth_enabled() && !self.is_local_bind()
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Parses a variable as `T`, returning `default` on missing or invalid
/// values.
fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> RelayConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RelayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.bind_host, "127.0.0.1");
        assert!(cfg.control_token.is_empty());
        assert_eq!(cfg.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(cfg.classify_grace, Duration::from_secs(1));
        assert_eq!(cfg.outbound_capacity, 256);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert!(!cfg.auth_enabled());
        assert!(!cfg.is_exposed());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("WFL_BIND_HOST", "0.0.0.0"),
            ("WFL_CONTROL_TOKEN", " s3cret "),
            ("WFL_HEARTBEAT_INTERVAL_MS", "500"),
            ("WFL_LOG_FORMAT", "JSON"),
        ]);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert_eq!(cfg.control_token, "s3cret");
        assert_eq!(cfg.heartbeat_interval, Duration::from_millis(500));
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert!(cfg.auth_enabled());
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = config(&[("PORT", "eighty"), ("WFL_OUTBOUND_CAPACITY", "0")]);
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.outbound_capacity, 1);
    }

    #[test]
    fn local_bind_detection() {
        assert!(config(&[("WFL_BIND_HOST", "localhost")]).is_local_bind());
        assert!(config(&[("WFL_BIND_HOST", "::1")]).is_local_bind());
        let open = config(&[("WFL_BIND_HOST", "0.0.0.0")]);
        assert!(!open.is_local_bind());
        assert!(open.is_exposed());
    }

    #[test]
    fn ipv6_bind_addr_is_bracketed() {
        let cfg = config(&[("WFL_BIND_HOST", "::1"), ("PORT", "9000")]);
        assert_eq!(cfg.bind_addr(), "[::1]:9000");
    }
}
