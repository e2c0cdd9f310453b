use crate::case::{Case, StepFuture};
use crate::crud::Crud;
use graphcheck_http::{HttpClient, Payload};
use graphcheck_model::{Draft, ResourceKind};
use graphcheck_runner::check::expect_error;
use graphcheck_runner::{Scenario, ScenarioContext};

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    let mut scenarios = Crud::all(ResourceKind::Task);
    scenarios.push(
        Case::new(
            "todos_create_xml_with_id",
            ResourceKind::Task,
            "XML create carrying an <id> element is rejected with 400",
            create_xml_with_id,
        )
        .boxed(),
    );
    scenarios
}

fn create_xml_with_id(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let draft = Draft::task("Laundry")
            .description("before 3pm")
            .done_status(false)
            .with_id("null");
        let response = ctx
            .client()
            .post("todos", &Payload::Xml(draft.to_xml()?))
            .await?;
        expect_error(&response, 400)?;
        Ok(())
    })
}
