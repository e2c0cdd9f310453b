//! Run reports

use crate::error::RunnerError;
use crate::scenario::Conformance;
use chrono::{DateTime, Utc};
use graphcheck_model::ResourceKind;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Passed,
    Failed,
}

/// Result of one scenario execution
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioRecord {
    pub name: String,
    #[serde(serialize_with = "serialize_collection")]
    pub resource: ResourceKind,
    pub conformance: Conformance,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cleanup_warnings: Vec<String>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl ScenarioRecord {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }

    /// A failure that counts against the run. Failing `Documented`
    /// companions are the expected result against the reference service.
    pub fn is_blocking_failure(&self) -> bool {
        self.outcome == Outcome::Failed && self.conformance != Conformance::Documented
    }
}

/// Reports name resources by collection, as the console table does
fn serialize_collection<S: serde::Serializer>(kind: &ResourceKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.collection())
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Failed `Documented` companions, included in `failed`
    pub expected_failures: usize,
    pub cleanup_warnings: usize,
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub strict: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counts: ReportCounts,
    pub scenarios: Vec<ScenarioRecord>,
}

impl RunReport {
    pub fn new(
        seed: u64,
        strict: bool,
        started_at: DateTime<Utc>,
        scenarios: Vec<ScenarioRecord>,
    ) -> Self {
        let counts = ReportCounts {
            total: scenarios.len(),
            passed: scenarios.iter().filter(|s| s.passed()).count(),
            failed: scenarios.iter().filter(|s| !s.passed()).count(),
            expected_failures: scenarios
                .iter()
                .filter(|s| !s.passed() && s.conformance == Conformance::Documented)
                .count(),
            cleanup_warnings: scenarios.iter().map(|s| s.cleanup_warnings.len()).sum(),
        };
        Self {
            seed,
            strict,
            started_at,
            finished_at: Utc::now(),
            counts,
            scenarios,
        }
    }

    pub fn record(&self, name: &str) -> Option<&ScenarioRecord> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioRecord> {
        self.scenarios.iter().filter(|s| !s.passed())
    }

    /// 0 when every non-`Documented` scenario passed; under `strict` any
    /// failure counts.
    pub fn exit_code(&self) -> i32 {
        let failing = if self.strict {
            self.counts.failed > 0
        } else {
            self.scenarios.iter().any(ScenarioRecord::is_blocking_failure)
        };
        i32::from(failing)
    }

    /// Plain-text table, one line per scenario in execution order
    pub fn render_table(&self) -> String {
        let width = self
            .scenarios
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(8)
            .max(8);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<6} {:<width$} {:<10} {:<11} {:>8}",
            "RESULT", "SCENARIO", "RESOURCE", "CONFORMANCE", "MS",
            width = width
        );
        for record in &self.scenarios {
            let result = match (record.outcome, record.conformance) {
                (Outcome::Passed, _) => "PASS",
                (Outcome::Failed, Conformance::Documented) => "XFAIL",
                (Outcome::Failed, _) => "FAIL",
            };
            let _ = writeln!(
                out,
                "{:<6} {:<width$} {:<10} {:<11} {:>8}",
                result,
                record.name,
                record.resource.collection(),
                record.conformance.to_string(),
                record.duration.as_millis(),
                width = width
            );
            if let Some(detail) = &record.detail {
                let _ = writeln!(out, "       {}", detail);
            }
            for warning in &record.cleanup_warnings {
                let _ = writeln!(out, "       cleanup: {}", warning);
            }
        }
        let _ = writeln!(
            out,
            "\n{} scenarios: {} passed, {} failed ({} expected), {} cleanup warnings, seed {}",
            self.counts.total,
            self.counts.passed,
            self.counts.failed,
            self.counts.expected_failures,
            self.counts.cleanup_warnings,
            self.seed
        );
        out
    }

    pub fn to_json(&self) -> Result<String, RunnerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), RunnerError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
