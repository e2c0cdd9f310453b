//! HEAD responses carry a fixed header set

use crate::fixtures::SEED_ID;
use async_trait::async_trait;
use graphcheck_http::HttpClient;
use graphcheck_model::ResourceKind;
use graphcheck_runner::check::expect_head_shape;
use graphcheck_runner::{Scenario, ScenarioContext, ScenarioResult};

struct HeadShape {
    kind: ResourceKind,
    path: String,
    name: String,
}

impl HeadShape {
    fn new(kind: ResourceKind, path: String) -> Self {
        Self {
            kind,
            name: format!("headers_{}", path.replace('/', "_")),
            path,
        }
    }
}

#[async_trait]
impl Scenario for HeadShape {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        "HEAD answers 200 with exactly date, content-type, transfer-encoding and server"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let response = ctx.client().head(&self.path).await?;
        expect_head_shape(&response)
    }
}

/// Collection, seeded item and both relation endpoints of every kind
pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    let mut scenarios: Vec<Box<dyn Scenario>> = Vec::new();
    for kind in ResourceKind::ALL {
        scenarios.push(Box::new(HeadShape::new(kind, kind.collection_path())));
        scenarios.push(Box::new(HeadShape::new(kind, kind.item_path(SEED_ID))));
        for relation in kind.relations() {
            scenarios.push(Box::new(HeadShape::new(kind, relation.collection_path(SEED_ID))));
        }
    }
    scenarios
}
