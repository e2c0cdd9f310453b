//! PUT replaces relation lists, POST merges them

use crate::case::{Case, StepFuture};
use crate::fixtures::sample_draft;
use graphcheck_http::{HttpClient, Payload};
use graphcheck_model::{parse_one, Draft, Relation, Resource, ResourceKind};
use graphcheck_runner::check::{ensure, expect_status};
use graphcheck_runner::{Conformance, Scenario, ScenarioContext, ScenarioResult};

const TASKSOF: &str = "tasksof";

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    vec![
        Case::new(
            "replace_put_empty_list_clears",
            ResourceKind::Task,
            "PUT with an empty tasksof list removes every project link",
            put_clears,
        )
        .conformance(Conformance::Observed)
        .boxed(),
        Case::new(
            "replace_post_empty_list_preserves",
            ResourceKind::Task,
            "POST with an empty tasksof list leaves project links in place",
            post_preserves,
        )
        .conformance(Conformance::Observed)
        .boxed(),
    ]
}

/// A todo linked to a project created through `todos/:id/tasksof` as XML
async fn task_with_project(ctx: &mut ScenarioContext) -> ScenarioResult<(Resource, String)> {
    let task = ctx.create(&sample_draft(ResourceKind::Task)).await?;
    let relation = Relation::TaskProjects;
    let xml = sample_draft(ResourceKind::Project).to_xml()?;
    let response = ctx
        .client()
        .post(&relation.collection_path(task.id()), &Payload::Xml(xml))
        .await?;
    expect_status(&response, 201)?;
    let project = parse_one(&response.body, ResourceKind::Project)?;
    ctx.track(ResourceKind::Project, project.id());

    let linked = ctx.fetch(ResourceKind::Task, task.id()).await?;
    ensure(linked.relation_ids(TASKSOF).contains(&project.id()), || {
        format!("todo {} does not list project {}", task.id(), project.id())
    })?;
    Ok((linked, project.id().to_string()))
}

fn emptied_update(task: &Resource) -> Draft {
    Draft::task(task.title())
        .description("relations emptied")
        .done_status(true)
        .links(TASKSOF, Vec::<String>::new())
}

fn put_clears(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let (task, _) = task_with_project(ctx).await?;
        let draft = emptied_update(&task);
        let response = ctx
            .client()
            .put(&ResourceKind::Task.item_path(task.id()), &Payload::Json(draft.to_json()))
            .await?;
        expect_status(&response, 200)?;
        let updated = parse_one(&response.body, ResourceKind::Task)?;
        ensure(!updated.has_field(TASKSOF), || {
            format!("PUT response still carries {:?}", updated.relation_ids(TASKSOF))
        })?;

        let stored = ctx.fetch(ResourceKind::Task, task.id()).await?;
        ensure(stored.relation_ids(TASKSOF).is_empty(), || {
            format!("stored todo still lists {:?}", stored.relation_ids(TASKSOF))
        })
    })
}

fn post_preserves(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let (task, project_id) = task_with_project(ctx).await?;
        let draft = emptied_update(&task);
        let response = ctx
            .client()
            .post(&ResourceKind::Task.item_path(task.id()), &Payload::Json(draft.to_json()))
            .await?;
        expect_status(&response, 200)?;
        let updated = parse_one(&response.body, ResourceKind::Task)?;
        ensure(updated.relation_ids(TASKSOF).contains(&project_id.as_str()), || {
            format!("POST dropped the link to project {}", project_id)
        })
    })
}
