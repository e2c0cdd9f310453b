//! Domain-specific configuration modules

pub mod http;
pub mod load;
pub mod logging;
pub mod scenarios;
pub mod target;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main graphcheck configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphcheckConfig {
    /// Target service under test
    #[serde(default)]
    pub target: target::TargetConfig,

    /// HTTP transport configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Conformance scenario run configuration
    #[serde(default)]
    pub scenarios: scenarios::ScenarioConfig,

    /// Load/performance run configuration
    #[serde(default)]
    pub load: load::LoadConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl GraphcheckConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.http.validate()?;
        self.scenarios.validate()?;
        self.load.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = GraphcheckConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
