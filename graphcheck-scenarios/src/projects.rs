use crate::case::{Case, StepFuture};
use crate::crud::Crud;
use crate::fixtures::sample_draft;
use graphcheck_http::{HttpClient, Payload};
use graphcheck_model::{parse_one, Draft, ResourceKind};
use graphcheck_runner::check::{ensure, expect_empty_body, expect_status};
use graphcheck_runner::{Scenario, ScenarioContext};

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    let mut scenarios = Crud::all(ResourceKind::Project);
    scenarios.push(
        Case::new(
            "projects_flags_as_strings",
            ResourceKind::Project,
            "completed and active come back as \"true\"/\"false\" on create and update",
            flags_as_strings,
        )
        .boxed(),
    );
    scenarios.push(
        Case::new(
            "projects_trailing_slash_not_found",
            ResourceKind::Project,
            "GET projects/ without an id answers 404 with an empty body",
            trailing_slash_not_found,
        )
        .boxed(),
    );
    scenarios
}

fn flags_as_strings(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let created = ctx.create(&sample_draft(ResourceKind::Project)).await?.to_project()?;
        ensure(
            created.completed.as_str() == "false" && created.active.as_str() == "true",
            || format!("created with completed={:?} active={:?}", created.completed, created.active),
        )?;

        let flipped = Draft::project(created.title.clone()).completed(true).active(false);
        let response = ctx
            .client()
            .put(&ResourceKind::Project.item_path(&created.id), &Payload::Json(flipped.to_json()))
            .await?;
        expect_status(&response, 200)?;
        let updated = parse_one(&response.body, ResourceKind::Project)?.to_project()?;
        ensure(
            updated.completed.as_bool() == Some(true) && updated.active.as_bool() == Some(false),
            || format!("updated with completed={:?} active={:?}", updated.completed, updated.active),
        )
    })
}

fn trailing_slash_not_found(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let response = ctx.client().get("projects/").await?;
        expect_status(&response, 404)?;
        expect_empty_body(&response)
    })
}
