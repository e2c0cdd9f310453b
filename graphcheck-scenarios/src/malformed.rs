//! Payloads the service must refuse with 400

use crate::case::{Case, StepFuture};
use crate::fixtures::{sample_draft, SEED_ID};
use async_trait::async_trait;
use graphcheck_http::{HttpClient, Payload};
use graphcheck_model::{Draft, FieldValue, Relation, ResourceKind};
use graphcheck_runner::check::expect_error;
use graphcheck_runner::{Scenario, ScenarioContext, ScenarioResult};

#[derive(Debug, Clone, Copy)]
enum Defect {
    UnknownFieldJson,
    UnknownFieldXml,
    MissingTitle,
}

impl Defect {
    fn label(&self) -> &'static str {
        match self {
            Defect::UnknownFieldJson => "unknown_field_json",
            Defect::UnknownFieldXml => "unknown_field_xml",
            Defect::MissingTitle => "missing_title",
        }
    }
}

struct Rejected {
    kind: ResourceKind,
    defect: Defect,
    name: String,
}

#[async_trait]
impl Scenario for Rejected {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        match self.defect {
            Defect::UnknownFieldJson => "JSON create with an unknown field answers 400",
            Defect::UnknownFieldXml => "XML create with an unknown element answers 400",
            Defect::MissingTitle => "create without the required title answers 400",
        }
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let unknown = sample_draft(self.kind).with_field("error", FieldValue::Text("false".into()));
        let payload = match self.defect {
            Defect::UnknownFieldJson => Payload::Json(unknown.to_json()),
            Defect::UnknownFieldXml => Payload::Xml(unknown.to_xml()?),
            Defect::MissingTitle => Payload::Json(sample_draft(self.kind).without("title").to_json()),
        };
        let response = ctx
            .client()
            .post(&self.kind.collection_path(), &payload)
            .await?;
        if response.status == 201 {
            // Keep the fixture clean even when the service accepted it
            if let Ok(created) = graphcheck_model::parse_one(&response.body, self.kind) {
                ctx.track(self.kind, created.id());
            }
        }
        expect_error(&response, 400)?;
        Ok(())
    }
}

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    let mut scenarios: Vec<Box<dyn Scenario>> = Vec::new();
    for kind in ResourceKind::ALL {
        for defect in [Defect::UnknownFieldJson, Defect::UnknownFieldXml, Defect::MissingTitle] {
            scenarios.push(Box::new(Rejected {
                kind,
                defect,
                name: format!("malformed_{}_{}", kind.collection(), defect.label()),
            }));
        }
    }
    scenarios.push(
        Case::new(
            "malformed_unknown_field_relation",
            ResourceKind::Category,
            "creating through todos/1/categories with an unknown field answers 400",
            unknown_field_relation,
        )
        .boxed(),
    );
    scenarios
}

fn unknown_field_relation(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let draft = Draft::category("School")
            .with_field("Virus", FieldValue::Text("Hi".into()))
            .description("Winter term");
        let path = Relation::TaskCategories.collection_path(SEED_ID);
        let response = ctx.client().post(&path, &Payload::Json(draft.to_json())).await?;
        if response.status == 201 {
            if let Ok(created) = graphcheck_model::parse_one(&response.body, ResourceKind::Category) {
                ctx.track(ResourceKind::Category, created.id());
            }
        }
        expect_error(&response, 400)?;
        Ok(())
    })
}
