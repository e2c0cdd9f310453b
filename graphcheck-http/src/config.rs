//! HTTP configuration

use graphcheck_config::HttpConfig as ConfigHttpConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base endpoint every relative path is joined onto
    pub endpoint: String,

    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// User agent string
    pub user_agent: String,

    /// Idle connections kept per host
    pub max_idle_per_host: usize,

    /// Idle connection timeout
    pub idle_timeout: Duration,
}

impl HttpConfig {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn from_config(endpoint: impl Into<String>, config: ConfigHttpConfig) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            user_agent: config.user_agent,
            max_idle_per_host: config.max_idle_per_host,
            idle_timeout: config.idle_timeout,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        let config = ConfigHttpConfig::default();
        Self::from_config("http://localhost:4567/", config)
    }
}
