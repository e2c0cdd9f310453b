//! Scenario execution for graphcheck
//!
//! A [`ScenarioRunner`] probes the target once, shuffles the selected
//! scenarios with a reported seed and runs each one in isolation: every
//! scenario gets a fresh [`ScenarioContext`] whose cleanup ledger is drained
//! whether the scenario passed or not. Results are collected into a
//! [`RunReport`].

pub mod check;
pub mod context;
pub mod error;
pub mod report;
pub mod runner;
pub mod scenario;

pub use context::ScenarioContext;
pub use error::{RunnerError, ScenarioError, ScenarioResult};
pub use report::{Outcome, ReportCounts, RunReport, ScenarioRecord};
pub use runner::{RunnerOptions, RunnerState, ScenarioRunner};
pub use scenario::{Conformance, Scenario};
