//! Telemetry configuration from environment variables.

use std::env;

/// Default service name
pub const DEFAULT_SERVICE_NAME: &str = "handle-availability";

/// Configuration for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Component (crate) emitting the logs, empty for the whole service
    pub component: String,

    /// Log level filter (trace, debug, info, warn, error, or an EnvFilter directive)
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            component: String::new(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: handle-availability)
    /// - `HC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `HC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `HC_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Create configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            component: defaults.component,
            log_level: lookup("HC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("HC_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),
            json_logs: lookup("HC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }

    /// Create configuration for a specific component.
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.component = component.to_string();
        config
    }

    /// Service name qualified by the component, if any.
    pub fn full_service_name(&self) -> String {
        if self.component.is_empty() {
            self.service_name.clone()
        } else {
            format!("{}/{}", self.service_name, self.component)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        assert_eq!(TelemetryConfig::from_lookup(|_| None), TelemetryConfig::default());
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("OTEL_SERVICE_NAME", "handles"),
            ("RUST_LOG", "debug"),
            ("HC_CONSOLE_OUTPUT", "0"),
            ("HC_JSON_LOGS", "TRUE"),
        ]));

        assert_eq!(config.service_name, "handles");
        assert_eq!(config.log_level, "debug");
        assert!(!config.console_output);
        assert!(config.json_logs);
    }

    #[test]
    fn test_hc_log_level_wins_over_rust_log() {
        let config = TelemetryConfig::from_lookup(lookup_from(&[
            ("HC_LOG_LEVEL", "warn"),
            ("RUST_LOG", "trace"),
        ]));

        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_full_service_name() {
        let mut config = TelemetryConfig::default();
        assert_eq!(config.full_service_name(), "handle-availability");

        config.component = "hc-02-lookup-coordinator".to_string();
        assert_eq!(
            config.full_service_name(),
            "handle-availability/hc-02-lookup-coordinator"
        );
    }
}
