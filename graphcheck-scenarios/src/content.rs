//! JSON and XML requests must describe the same resource

use crate::fixtures::sample_draft;
use async_trait::async_trait;
use graphcheck_model::ResourceKind;
use graphcheck_runner::check::{ensure, expect_fields};
use graphcheck_runner::{Scenario, ScenarioContext, ScenarioResult};

struct JsonXmlParity {
    kind: ResourceKind,
    name: String,
}

#[async_trait]
impl Scenario for JsonXmlParity {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        "the same draft sent as JSON and as XML creates identical attributes"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let draft = sample_draft(self.kind);
        let from_json = ctx.create(&draft).await?;
        let from_xml = ctx.create_xml(&draft).await?;

        expect_fields(&from_json, &draft.expected_fields())?;
        expect_fields(&from_xml, &draft.expected_fields())?;

        let mut json_fields = from_json.fields().clone();
        let mut xml_fields = from_xml.fields().clone();
        json_fields.remove("id");
        xml_fields.remove("id");
        ensure(json_fields == xml_fields, || {
            format!("JSON gave {:?}, XML gave {:?}", json_fields, xml_fields)
        })
    }
}

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    ResourceKind::ALL
        .into_iter()
        .map(|kind| {
            Box::new(JsonXmlParity {
                kind,
                name: format!("content_json_xml_parity_{}", kind.collection()),
            }) as Box<dyn Scenario>
        })
        .collect()
}
