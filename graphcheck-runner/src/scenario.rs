use crate::context::ScenarioContext;
use crate::error::ScenarioResult;
use async_trait::async_trait;
use graphcheck_model::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a scenario relates to the documented API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Conformance {
    /// Actual and documented behaviour agree
    #[default]
    Compliant,
    /// Asserts what the service actually does where it departs from the docs
    Observed,
    /// Asserts the documented behaviour; expected to fail against the
    /// reference service and never fails the run on its own
    Documented,
}

impl fmt::Display for Conformance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Conformance::Compliant => "compliant",
            Conformance::Observed => "observed",
            Conformance::Documented => "documented",
        };
        f.write_str(label)
    }
}

/// One independent conformance check.
///
/// Scenarios are stateless values; anything `setup` needs to hand over to
/// `run` goes through the [`ScenarioContext`]. `cleanup` runs even when
/// `setup` or `run` failed, and the context's ledger is drained after it.
#[async_trait]
pub trait Scenario: Send + Sync {
    fn name(&self) -> &str;

    fn resource(&self) -> ResourceKind;

    fn conformance(&self) -> Conformance {
        Conformance::Compliant
    }

    fn description(&self) -> &str;

    async fn setup(&self, _ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        Ok(())
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()>;

    async fn cleanup(&self, _ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        Ok(())
    }
}
