use crate::case::{Case, StepFuture};
use crate::crud::Crud;
use crate::fixtures::SEED_ID;
use graphcheck_http::HttpClient;
use graphcheck_model::{Relation, ResourceKind};
use graphcheck_runner::check::{ensure, expect_status};
use graphcheck_runner::{Conformance, Scenario, ScenarioContext};

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    let mut scenarios = Crud::all(ResourceKind::Category);
    scenarios.push(
        Case::new(
            "categories_seed_projects_empty",
            ResourceKind::Category,
            "categories/1/projects answers exactly {\"projects\":[]}",
            seed_projects_empty,
        )
        .conformance(Conformance::Observed)
        .boxed(),
    );
    scenarios
}

fn seed_projects_empty(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let path = Relation::CategoryProjects.collection_path(SEED_ID);
        let response = ctx.client().get(&path).await?;
        expect_status(&response, 200)?;
        ensure(response.body == r#"{"projects":[]}"#, || {
            format!("unexpected body {}", response.body)
        })
    })
}
