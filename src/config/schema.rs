//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the filter.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::routing::RuleSpec;

/// Root configuration for the webhook filter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FilterConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Rules as a JSON array string. Takes precedence over `rules`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_json: Option<String>,

    /// Rules as TOML tables, in match order.
    pub rules: Vec<RuleSpec>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Largest webhook body accepted, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole inbound request timeout in seconds, forwarding included.
    pub request_secs: u64,

    /// Outbound forward timeout in seconds.
    pub forward_secs: u64,

    /// How long shutdown waits for in-flight requests, in seconds.
    pub shutdown_grace_secs: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    pub fn forward(&self) -> Duration {
        Duration::from_secs(self.forward_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 60,
            forward_secs: 30,
            shutdown_grace_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FilterConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.shutdown_grace(), Duration::from_secs(30));
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(!config.observability.metrics_enabled);
        assert!(config.rules.is_empty());
        assert!(config.rules_json.is_none());
    }

    #[test]
    fn test_full_toml() {
        let config: FilterConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"
            max_body_bytes = 1024

            [timeouts]
            request_secs = 5
            forward_secs = 2
            shutdown_grace_secs = 1

            [observability]
            log_level = "debug"
            log_format = "json"
            metrics_enabled = true
            metrics_address = "127.0.0.1:9191"

            [[rules]]
            ref = "refs/heads/main"
            target = "http://main"

            [[rules]]
            ref = ""
            target = "http://{{ .repository.name }}"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_body_bytes, 1024);
        assert_eq!(config.timeouts.forward(), Duration::from_secs(2));
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0], RuleSpec::new("refs/heads/main", "http://main"));
        assert_eq!(config.rules[1].git_ref, "");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: FilterConfig = toml::from_str("[timeouts]\nforward_secs = 3\n").unwrap();
        assert_eq!(config.timeouts.forward_secs, 3);
        assert_eq!(config.timeouts.request_secs, 60);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_rule_tables_reject_unknown_fields() {
        let result = toml::from_str::<FilterConfig>(
            "[[rules]]\nref = \"x\"\ntarget = \"y\"\nextra = \"z\"\n",
        );
        assert!(result.is_err());
    }
}
