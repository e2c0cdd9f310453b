//! Conformance scenario run configuration

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Shuffle seed; a fresh one is drawn when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Only run scenarios whose name contains this substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Count failed discrepancy companions towards the exit status
    #[serde(default = "crate::domains::utils::default_false")]
    pub strict: bool,

    /// Write the JSON report here in addition to the console table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_path: Option<PathBuf>,
}

impl Validatable for ScenarioConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(filter) = &self.filter {
            if filter.trim().is_empty() {
                return Err(self.validation_error("filter cannot be blank when set"));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "scenarios"
    }
}
