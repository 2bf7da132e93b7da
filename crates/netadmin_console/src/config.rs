use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // Inventory service
    /// Base URL of the inventory REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Operator email used to sign in
    #[serde(default)]
    pub operator_email: String,

    /// Operator password used to sign in
    #[serde(default)]
    #[serde(skip_serializing)]
    pub operator_password: String,

    // Polling
    /// Scan history refresh period in seconds
    #[serde(default = "default_history_poll_interval_secs")]
    pub history_poll_interval_secs: u64,

    /// Number of scan results fetched per history refresh
    #[serde(default = "default_scan_history_limit")]
    pub scan_history_limit: u32,

    /// Number of entries in the recent activity digest
    #[serde(default = "default_recent_activity_count")]
    pub recent_activity_count: usize,

    // Telemetry
    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,

    /// Time allowed for shutdown tasks in seconds
    #[serde(default = "default_closer_timeout_secs")]
    pub closer_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_history_poll_interval_secs() -> u64 {
    5
}

fn default_scan_history_limit() -> u32 {
    50
}

fn default_recent_activity_count() -> usize {
    5
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "netadmin-console".to_string()
}

fn default_closer_timeout_secs() -> u64 {
    10
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("NETADMIN"))
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn history_poll_interval(&self) -> Duration {
        Duration::from_secs(self.history_poll_interval_secs.max(1))
    }

    pub fn closer_timeout(&self) -> Duration {
        Duration::from_secs(self.closer_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching NETADMIN_ variables must not overlap
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 4] = [
        "NETADMIN_LOG_LEVEL",
        "NETADMIN_API_BASE_URL",
        "NETADMIN_HISTORY_POLL_INTERVAL_SECS",
        "NETADMIN_OPERATOR_EMAIL",
    ];

    fn clear_vars() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_vars();

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.history_poll_interval(), Duration::from_secs(5));
        assert_eq!(config.scan_history_limit, 50);
        assert_eq!(config.recent_activity_count, 5);
        assert!(config.operator_email.is_empty());
        assert!(!config.otel_enabled);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_vars();
        std::env::set_var("NETADMIN_LOG_LEVEL", "debug");
        std::env::set_var("NETADMIN_API_BASE_URL", "http://inventory:9000/");
        std::env::set_var("NETADMIN_HISTORY_POLL_INTERVAL_SECS", "15");
        std::env::set_var("NETADMIN_OPERATOR_EMAIL", "admin@test.com");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.api_base_url, "http://inventory:9000/");
        assert_eq!(config.history_poll_interval(), Duration::from_secs(15));
        assert_eq!(config.operator_email, "admin@test.com");

        clear_vars();
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let _lock = TEST_LOCK.lock().unwrap();
        clear_vars();
        std::env::set_var("NETADMIN_HISTORY_POLL_INTERVAL_SECS", "0");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.history_poll_interval(), Duration::from_secs(1));

        clear_vars();
    }
}
