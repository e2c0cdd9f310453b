//! Sub-collection endpoints and the visibility of links from both sides
//!
//! Where the service departs from its documentation the catalog carries two
//! scenarios: an `Observed` one asserting what happens and a `Documented`
//! companion asserting what the docs promise.

use crate::case::{Case, StepFuture};
use crate::fixtures::{remember_absent, sample_draft, MISSING_ID, SEED_ID};
use async_trait::async_trait;
use graphcheck_http::{HttpClient, Payload};
use graphcheck_model::{parse_listing, Draft, Relation, Resource, ResourceKind, Visibility};
use graphcheck_runner::check::{ensure, expect_empty_body, expect_error, expect_status};
use graphcheck_runner::{Conformance, Scenario, ScenarioContext, ScenarioError, ScenarioResult};
use serde_json::json;

fn slug(relation: Relation) -> String {
    format!("{}_{}", relation.owner().collection(), relation.segment())
}

fn ids(resources: &[Resource]) -> Vec<&str> {
    resources.iter().map(Resource::id).collect()
}

/// Create an owner and a target linked to it through `relation`
async fn linked_pair(
    ctx: &mut ScenarioContext,
    relation: Relation,
) -> ScenarioResult<(Resource, Resource)> {
    let owner = ctx.create(&sample_draft(relation.owner())).await?;
    let target = ctx
        .create_via(relation, owner.id(), &sample_draft(relation.target()))
        .await?;
    Ok((owner, target))
}

/// Create through a relation endpoint, then look at the link from the owner
/// and from the target.
struct CreateVia {
    relation: Relation,
    /// Expect the reciprocal link the documentation describes instead of the
    /// one the service maintains
    documented: bool,
    name: String,
}

impl CreateVia {
    fn new(relation: Relation, documented: bool) -> Self {
        let suffix = if documented { "_documented" } else { "" };
        Self {
            relation,
            documented,
            name: format!("relations_create_via_{}{}", slug(relation), suffix),
        }
    }

    fn expected_visibility(&self) -> Visibility {
        if self.documented {
            Visibility::Mirrored
        } else {
            self.relation.reciprocal_visibility()
        }
    }
}

#[async_trait]
impl Scenario for CreateVia {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.relation.owner()
    }

    fn conformance(&self) -> Conformance {
        if self.documented {
            Conformance::Documented
        } else if self.relation.reciprocal_visibility() == Visibility::Absent {
            Conformance::Observed
        } else {
            Conformance::Compliant
        }
    }

    fn description(&self) -> &str {
        if self.documented {
            "a link created from the owner is also listed from the target"
        } else {
            "a link created from the owner is listed forward; the reverse follows the contract"
        }
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let relation = self.relation;
        let (owner, target) = linked_pair(ctx, relation).await?;

        let forward = ctx.list_relation(relation, owner.id()).await?;
        ensure(ids(&forward).contains(&target.id()), || {
            format!(
                "{} does not list {} (got {:?})",
                relation.collection_path(owner.id()),
                target.id(),
                ids(&forward)
            )
        })?;
        let owner_now = ctx.fetch(relation.owner(), owner.id()).await?;
        ensure(owner_now.relation_ids(relation.segment()).contains(&target.id()), || {
            format!("{} {} has no {} link to {}", relation.owner(), owner.id(), relation.segment(), target.id())
        })?;

        let reverse = relation.reciprocal();
        let backward = ctx.list_relation(reverse, target.id()).await?;
        let visible = ids(&backward).contains(&owner.id());
        match self.expected_visibility() {
            Visibility::Mirrored => {
                ensure(visible, || {
                    format!(
                        "{} does not list owner {}",
                        reverse.collection_path(target.id()),
                        owner.id()
                    )
                })?;
                ensure(target.relation_ids(reverse.segment()).contains(&owner.id()), || {
                    format!("created {} lacks {} link to {}", relation.target(), reverse.segment(), owner.id())
                })
            }
            Visibility::Absent => ensure(!visible, || {
                format!(
                    "{} unexpectedly lists owner {}",
                    reverse.collection_path(target.id()),
                    owner.id()
                )
            }),
        }
    }
}

/// Remove a link through `owner/:id/segment/:target` and check both sides
struct Unlink {
    relation: Relation,
    name: String,
}

#[async_trait]
impl Scenario for Unlink {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.relation.owner()
    }

    fn description(&self) -> &str {
        "deleting a link answers 200, removes it and keeps the target"
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let relation = self.relation;
        let (owner, target) = linked_pair(ctx, relation).await?;

        let response = ctx
            .client()
            .delete(&relation.item_path(owner.id(), target.id()))
            .await?;
        expect_status(&response, 200)?;
        expect_empty_body(&response)?;

        let forward = ctx.list_relation(relation, owner.id()).await?;
        ensure(!ids(&forward).contains(&target.id()), || {
            format!("{} still lists {}", relation.collection_path(owner.id()), target.id())
        })?;
        if relation.reciprocal_visibility() == Visibility::Mirrored {
            let backward = ctx.list_relation(relation.reciprocal(), target.id()).await?;
            ensure(!ids(&backward).contains(&owner.id()), || {
                format!("reverse link to {} survived the delete", owner.id())
            })?;
        }

        // Unlinking never deletes the target itself
        ctx.fetch(relation.target(), target.id()).await.map(|_| ())
    }
}

/// Delete a link to a target that does not exist
struct UnlinkMissing {
    relation: Relation,
    name: String,
}

#[async_trait]
impl Scenario for UnlinkMissing {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.relation.owner()
    }

    fn description(&self) -> &str {
        "deleting a link to an absent target answers 404 with errorMessages"
    }

    async fn setup(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        remember_absent(ctx, self.relation.target()).await
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let missing = ctx.value(MISSING_ID)?.to_string();
        let response = ctx
            .client()
            .delete(&self.relation.item_path(SEED_ID, &missing))
            .await?;
        expect_error(&response, 404).map(|_| ())
    }
}

pub fn scenarios() -> Vec<Box<dyn Scenario>> {
    let mut scenarios: Vec<Box<dyn Scenario>> = Vec::new();
    for relation in Relation::ALL {
        scenarios.push(Box::new(CreateVia::new(relation, false)));
        if relation.is_documented_discrepancy() {
            scenarios.push(Box::new(CreateVia::new(relation, true)));
        }
        scenarios.push(Box::new(Unlink {
            relation,
            name: format!("relations_unlink_{}", slug(relation)),
        }));
        scenarios.push(Box::new(UnlinkMissing {
            relation,
            name: format!("relations_unlink_missing_{}", slug(relation)),
        }));
    }

    scenarios.push(
        Case::new(
            "relations_missing_owner_listing_observed",
            ResourceKind::Task,
            "listing categories of an absent todo answers 200 with a listing",
            missing_owner_listing_observed,
        )
        .conformance(Conformance::Observed)
        .setup(missing_task)
        .boxed(),
    );
    scenarios.push(
        Case::new(
            "relations_missing_owner_listing_documented",
            ResourceKind::Task,
            "listing categories of an absent todo answers 404",
            missing_owner_listing_documented,
        )
        .conformance(Conformance::Documented)
        .setup(missing_task)
        .boxed(),
    );
    scenarios.push(
        Case::new(
            "relations_create_on_missing_owner",
            ResourceKind::Task,
            "creating a project through an absent todo answers 404",
            create_on_missing_owner,
        )
        .setup(missing_task)
        .boxed(),
    );
    scenarios.push(
        Case::new(
            "relations_client_id_links_existing_observed",
            ResourceKind::Task,
            "a sub-collection create naming an existing id links it and keeps its title",
            client_id_observed,
        )
        .conformance(Conformance::Observed)
        .boxed(),
    );
    scenarios.push(
        Case::new(
            "relations_client_id_links_existing_documented",
            ResourceKind::Task,
            "a sub-collection create naming an existing id updates its title",
            client_id_documented,
        )
        .conformance(Conformance::Documented)
        .boxed(),
    );
    scenarios
}

fn missing_task(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(remember_absent(ctx, ResourceKind::Task))
}

fn missing_owner_listing_observed(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let missing = ctx.value(MISSING_ID)?.to_string();
        let relation = Relation::TaskCategories;
        let response = ctx.client().get(&relation.collection_path(&missing)).await?;
        expect_status(&response, 200)?;
        parse_listing(&response.body, relation.listing_key(), relation.target())?;
        Ok(())
    })
}

fn missing_owner_listing_documented(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let missing = ctx.value(MISSING_ID)?.to_string();
        let response = ctx
            .client()
            .get(&Relation::TaskCategories.collection_path(&missing))
            .await?;
        expect_error(&response, 404).map(|_| ())
    })
}

fn create_on_missing_owner(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let missing = ctx.value(MISSING_ID)?.to_string();
        let draft = sample_draft(ResourceKind::Project);
        let response = ctx
            .client()
            .post(
                &Relation::TaskProjects.collection_path(&missing),
                &Payload::Xml(draft.to_xml()?),
            )
            .await?;
        if response.status == 201 {
            if let Ok(created) = graphcheck_model::parse_one(&response.body, ResourceKind::Project) {
                ctx.track(ResourceKind::Project, created.id());
            }
        }
        expect_error(&response, 404).map(|_| ())
    })
}

/// Link an existing category by id while also sending a new title. Returns
/// the category as the todo now lists it and the title that was sent.
async fn link_with_new_title(ctx: &mut ScenarioContext) -> ScenarioResult<(Resource, Resource)> {
    let task = ctx.create(&sample_draft(ResourceKind::Task)).await?;
    let existing = ctx.create(&Draft::category("Office copy")).await?;

    let body = json!({
        "id": existing.id(),
        "title": "Renamed through link",
        "description": "replacement",
    });
    let relation = Relation::TaskCategories;
    let response = ctx
        .client()
        .post(&relation.collection_path(task.id()), &Payload::Json(body))
        .await?;
    expect_status(&response, 201)?;

    let listed = ctx.list_relation(relation, task.id()).await?;
    ensure(listed.len() == 1, || {
        format!("expected exactly the linked category, got {:?}", ids(&listed))
    })?;
    let linked = listed
        .into_iter()
        .next()
        .ok_or_else(|| ScenarioError::assertion("no linked category"))?;
    ensure(linked.id() == existing.id(), || {
        format!("linked {} instead of existing {}", linked.id(), existing.id())
    })?;
    Ok((existing, linked))
}

fn client_id_observed(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let (existing, linked) = link_with_new_title(ctx).await?;
        ensure(linked.title() == existing.title(), || {
            format!("title changed from {:?} to {:?}", existing.title(), linked.title())
        })
    })
}

fn client_id_documented(ctx: &mut ScenarioContext) -> StepFuture<'_> {
    Box::pin(async move {
        let (_, linked) = link_with_new_title(ctx).await?;
        ensure(linked.title() == "Renamed through link", || {
            format!("title stayed {:?}", linked.title())
        })
    })
}
