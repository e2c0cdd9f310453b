//! Per-scenario state and the cleanup ledger

use crate::check::{ensure, expect_status};
use crate::error::{ScenarioError, ScenarioResult};
use graphcheck_http::{HttpClient, Payload, RawResponse};
use graphcheck_model::{parse, parse_listing, Draft, Relation, Resource, ResourceKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Title used for throwaway resources created to obtain an unused id
const PROBE_TITLE: &str = "graphcheck probe";

/// Everything one scenario execution owns.
///
/// Resources created through the helpers below are recorded in a ledger and
/// deleted in reverse creation order once the scenario is finished, so the
/// next scenario starts from the seeded fixture again.
pub struct ScenarioContext {
    client: Arc<dyn HttpClient>,
    ledger: Vec<(ResourceKind, String)>,
    values: HashMap<String, String>,
}

impl ScenarioContext {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            ledger: Vec::new(),
            values: HashMap::new(),
        }
    }

    pub fn client(&self) -> &dyn HttpClient {
        self.client.as_ref()
    }

    /// Record a created resource for deletion at the end of the scenario
    pub fn track(&mut self, kind: ResourceKind, id: impl Into<String>) {
        let id = id.into();
        debug!("Tracking {} {} for cleanup", kind, id);
        self.ledger.push((kind, id));
    }

    /// Drop a ledger entry the scenario already deleted itself
    pub fn forget(&mut self, kind: ResourceKind, id: &str) {
        self.ledger.retain(|(k, i)| !(*k == kind && i == id));
    }

    pub fn tracked(&self) -> &[(ResourceKind, String)] {
        &self.ledger
    }

    /// Hand a value from `setup` to `run`
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn value(&self, key: &str) -> ScenarioResult<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ScenarioError::MissingValue(key.to_string()))
    }

    /// POST a JSON draft to its collection, expecting 201
    pub async fn create(&mut self, draft: &Draft) -> ScenarioResult<Resource> {
        self.create_with(draft.kind(), &Payload::Json(draft.to_json()))
            .await
    }

    /// POST an XML draft to its collection, expecting 201
    pub async fn create_xml(&mut self, draft: &Draft) -> ScenarioResult<Resource> {
        self.create_with(draft.kind(), &Payload::Xml(draft.to_xml()?))
            .await
    }

    async fn create_with(&mut self, kind: ResourceKind, payload: &Payload) -> ScenarioResult<Resource> {
        let response = self.client.post(&kind.collection_path(), payload).await?;
        expect_status(&response, 201)?;
        let resource = graphcheck_model::parse_one(&response.body, kind)?;
        self.track(kind, resource.id());
        Ok(resource)
    }

    /// POST a draft through a relation endpoint, creating the target and
    /// linking it to `owner_id`.
    pub async fn create_via(
        &mut self,
        relation: Relation,
        owner_id: &str,
        draft: &Draft,
    ) -> ScenarioResult<Resource> {
        let path = relation.collection_path(owner_id);
        let response = self.client.post(&path, &Payload::Json(draft.to_json())).await?;
        expect_status(&response, 201)?;
        let resource = graphcheck_model::parse_one(&response.body, relation.target())?;
        self.track(relation.target(), resource.id());
        Ok(resource)
    }

    /// GET one resource; the service wraps it in a one-element listing
    pub async fn fetch(&self, kind: ResourceKind, id: &str) -> ScenarioResult<Resource> {
        let response = self.client.get(&kind.item_path(id)).await?;
        expect_status(&response, 200)?;
        let mut items = parse(&response.body, kind)?.into_vec();
        ensure(items.len() == 1, || {
            format!("GET {} returned {} resources", kind.item_path(id), items.len())
        })?;
        Ok(items.remove(0))
    }

    pub async fn list(&self, kind: ResourceKind) -> ScenarioResult<Vec<Resource>> {
        let response = self.client.get(&kind.collection_path()).await?;
        expect_status(&response, 200)?;
        Ok(parse_listing(&response.body, kind.collection(), kind)?)
    }

    pub async fn list_relation(
        &self,
        relation: Relation,
        owner_id: &str,
    ) -> ScenarioResult<Vec<Resource>> {
        let response = self.client.get(&relation.collection_path(owner_id)).await?;
        expect_status(&response, 200)?;
        Ok(parse_listing(
            &response.body,
            relation.listing_key(),
            relation.target(),
        )?)
    }

    /// Link an existing target to an owner through the relation endpoint
    pub async fn link(
        &self,
        relation: Relation,
        owner_id: &str,
        target_id: &str,
    ) -> ScenarioResult<RawResponse> {
        let body = Payload::Json(serde_json::json!({ "id": target_id }));
        Ok(self
            .client
            .post(&relation.collection_path(owner_id), &body)
            .await?)
    }

    /// An id that is guaranteed not to exist: create a resource and delete
    /// it. Ids are never reused by the service.
    pub async fn absent_id(&mut self, kind: ResourceKind) -> ScenarioResult<String> {
        let draft = Draft::new(kind, PROBE_TITLE);
        let response = self
            .client
            .post(&kind.collection_path(), &Payload::Json(draft.to_json()))
            .await?;
        expect_status(&response, 201)?;
        let id = graphcheck_model::parse_one(&response.body, kind)?
            .id()
            .to_string();
        // Tracked until the delete is confirmed, so a failure still gets cleaned up
        self.track(kind, id.clone());

        let response = self.client.delete(&kind.item_path(&id)).await?;
        expect_status(&response, 200)?;
        self.forget(kind, &id);
        Ok(id)
    }

    /// Delete everything in the ledger, newest first. Returns one warning per
    /// resource that could not be removed; a 404 means the scenario already
    /// removed it and is not a warning.
    pub async fn drain_cleanup(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        while let Some((kind, id)) = self.ledger.pop() {
            let path = kind.item_path(&id);
            match self.client.delete(&path).await {
                Ok(response) if response.status == 200 || response.status == 404 => {
                    debug!("Cleanup DELETE {} -> {}", path, response.status);
                }
                Ok(response) => {
                    warn!("Cleanup DELETE {} answered {}", path, response.status);
                    warnings.push(format!("DELETE {} answered {}", path, response.status));
                }
                Err(e) => {
                    warn!("Cleanup DELETE {} failed: {}", path, e);
                    warnings.push(format!("DELETE {} failed: {}", path, e));
                }
            }
        }
        warnings
    }
}
