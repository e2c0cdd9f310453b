//! Target service configuration

use crate::error::ConfigResult;
use crate::validation::{validate_url, Validatable};
use serde::{Deserialize, Serialize};

/// Where the service under test lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Base endpoint, e.g. `http://localhost:4567/`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Send `GET /shutdown` to the service once the run is over
    #[serde(default = "crate::domains::utils::default_false")]
    pub shutdown_on_exit: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            shutdown_on_exit: false,
        }
    }
}

impl Validatable for TargetConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.endpoint, "endpoint", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "target"
    }
}

fn default_endpoint() -> String {
    "http://localhost:4567/".to_string()
}
