//! Load/performance run configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Resource collection driven by a load run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadKind {
    Todos,
    #[default]
    Categories,
    Projects,
}

impl LoadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadKind::Todos => "todos",
            LoadKind::Categories => "categories",
            LoadKind::Projects => "projects",
        }
    }
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todos" | "todo" | "tasks" | "task" => Ok(LoadKind::Todos),
            "categories" | "category" => Ok(LoadKind::Categories),
            "projects" | "project" => Ok(LoadKind::Projects),
            _ => Err(format!("Invalid load kind: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Resource collection to drive
    #[serde(default)]
    pub kind: LoadKind,

    /// Object count N
    #[serde(default = "default_objects")]
    pub objects: usize,

    /// Sampling interval K (every Kth operation is sampled)
    #[serde(default = "default_interval")]
    pub interval: usize,

    /// Seed for payloads and permutations; a fresh one is drawn when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// CSV destination; defaults to `<kind>.csv` in the working directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl LoadConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.csv", self.kind)))
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            kind: LoadKind::default(),
            objects: default_objects(),
            interval: default_interval(),
            seed: None,
            output: None,
        }
    }
}

impl Validatable for LoadConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.objects, "objects", self.domain_name())?;
        validate_positive(self.interval, "interval", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "load"
    }
}

fn default_objects() -> usize {
    10_000
}

fn default_interval() -> usize {
    500
}
