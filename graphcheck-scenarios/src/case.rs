//! Scenarios defined by a plain async function

use async_trait::async_trait;
use graphcheck_model::ResourceKind;
use graphcheck_runner::{Conformance, Scenario, ScenarioContext, ScenarioResult};
use std::future::Future;
use std::pin::Pin;

pub(crate) type StepFuture<'a> = Pin<Box<dyn Future<Output = ScenarioResult<()>> + Send + 'a>>;

/// One step of a [`Case`]: borrows the context for the duration of the future
pub(crate) type Step = for<'a> fn(&'a mut ScenarioContext) -> StepFuture<'a>;

/// A one-off scenario that needs no parameters
pub(crate) struct Case {
    name: &'static str,
    resource: ResourceKind,
    conformance: Conformance,
    description: &'static str,
    setup: Option<Step>,
    run: Step,
}

impl Case {
    pub(crate) fn new(
        name: &'static str,
        resource: ResourceKind,
        description: &'static str,
        run: Step,
    ) -> Self {
        Self {
            name,
            resource,
            conformance: Conformance::Compliant,
            description,
            setup: None,
            run,
        }
    }

    pub(crate) fn conformance(mut self, conformance: Conformance) -> Self {
        self.conformance = conformance;
        self
    }

    pub(crate) fn setup(mut self, setup: Step) -> Self {
        self.setup = Some(setup);
        self
    }

    pub(crate) fn boxed(self) -> Box<dyn Scenario> {
        Box::new(self)
    }
}

#[async_trait]
impl Scenario for Case {
    fn name(&self) -> &str {
        self.name
    }

    fn resource(&self) -> ResourceKind {
        self.resource
    }

    fn conformance(&self) -> Conformance {
        self.conformance
    }

    fn description(&self) -> &str {
        self.description
    }

    async fn setup(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        match self.setup {
            Some(step) => step(ctx).await,
            None => Ok(()),
        }
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        (self.run)(ctx).await
    }
}
