//! Create/read/update/delete checks shared by every resource kind

use crate::fixtures::{
    changed_draft, created_field_count, remember_absent, sample_draft, seeded_minimum, MISSING_ID,
    SEED_ID,
};
use async_trait::async_trait;
use graphcheck_http::{HttpClient, Payload};
use graphcheck_model::{parse_one, Draft, Resource, ResourceKind};
use graphcheck_runner::check::{
    ensure, expect_empty_body, expect_error, expect_field_count, expect_fields, expect_status,
};
use graphcheck_runner::{Scenario, ScenarioContext, ScenarioResult};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CrudCheck {
    List,
    ReadSeed,
    ReadMissing,
    CreateJson,
    CreateXml,
    UpdatePut,
    UpdatePost,
    PutIdempotent,
    ListingRoundTrip,
    DeleteTwice,
    DeleteMissing,
    PostMissing,
    PutMissing,
}

impl CrudCheck {
    pub(crate) const ALL: [CrudCheck; 13] = [
        CrudCheck::List,
        CrudCheck::ReadSeed,
        CrudCheck::ReadMissing,
        CrudCheck::CreateJson,
        CrudCheck::CreateXml,
        CrudCheck::UpdatePut,
        CrudCheck::UpdatePost,
        CrudCheck::PutIdempotent,
        CrudCheck::ListingRoundTrip,
        CrudCheck::DeleteTwice,
        CrudCheck::DeleteMissing,
        CrudCheck::PostMissing,
        CrudCheck::PutMissing,
    ];

    fn label(&self) -> &'static str {
        match self {
            CrudCheck::List => "list",
            CrudCheck::ReadSeed => "read_by_id",
            CrudCheck::ReadMissing => "read_missing",
            CrudCheck::CreateJson => "create_json",
            CrudCheck::CreateXml => "create_xml",
            CrudCheck::UpdatePut => "update_put",
            CrudCheck::UpdatePost => "update_post",
            CrudCheck::PutIdempotent => "put_idempotent",
            CrudCheck::ListingRoundTrip => "listing_round_trip",
            CrudCheck::DeleteTwice => "delete_twice",
            CrudCheck::DeleteMissing => "delete_missing",
            CrudCheck::PostMissing => "post_missing",
            CrudCheck::PutMissing => "put_missing",
        }
    }

    fn description(&self) -> &'static str {
        match self {
            CrudCheck::List => "listing returns at least the seeded resources",
            CrudCheck::ReadSeed => "seeded resource 1 is returned with every attribute",
            CrudCheck::ReadMissing => "reading an absent id answers 404 with errorMessages",
            CrudCheck::CreateJson => "JSON create answers 201 with id plus attributes only",
            CrudCheck::CreateXml => "XML create answers 201 with id plus attributes only",
            CrudCheck::UpdatePut => "PUT replaces every attribute and keeps the id",
            CrudCheck::UpdatePost => "POST amends the given attributes and keeps the rest",
            CrudCheck::PutIdempotent => "repeating the same PUT yields the same resource",
            CrudCheck::ListingRoundTrip => "listing entry and single read agree field for field",
            CrudCheck::DeleteTwice => "delete answers 200 with empty body, then 404",
            CrudCheck::DeleteMissing => "deleting an absent id answers 404 with errorMessages",
            CrudCheck::PostMissing => "POST to an absent id answers 404 with errorMessages",
            CrudCheck::PutMissing => "PUT to an absent id answers 404 with errorMessages",
        }
    }

    fn needs_absent_id(&self) -> bool {
        matches!(
            self,
            CrudCheck::ReadMissing
                | CrudCheck::DeleteMissing
                | CrudCheck::PostMissing
                | CrudCheck::PutMissing
        )
    }
}

/// One CRUD check against one collection, e.g. `categories_update_put`
pub(crate) struct Crud {
    kind: ResourceKind,
    check: CrudCheck,
    name: String,
}

impl Crud {
    pub(crate) fn new(kind: ResourceKind, check: CrudCheck) -> Self {
        Self {
            kind,
            check,
            name: format!("{}_{}", kind.collection(), check.label()),
        }
    }

    /// Every CRUD check for `kind`
    pub(crate) fn all(kind: ResourceKind) -> Vec<Box<dyn Scenario>> {
        CrudCheck::ALL
            .into_iter()
            .map(|check| Box::new(Crud::new(kind, check)) as Box<dyn Scenario>)
            .collect()
    }

    async fn write(
        &self,
        ctx: &ScenarioContext,
        put: bool,
        id: &str,
        draft: &Draft,
    ) -> ScenarioResult<graphcheck_http::RawResponse> {
        let path = self.kind.item_path(id);
        let payload = Payload::Json(draft.to_json());
        let response = if put {
            ctx.client().put(&path, &payload).await?
        } else {
            ctx.client().post(&path, &payload).await?
        };
        Ok(response)
    }

    async fn updated(
        &self,
        ctx: &ScenarioContext,
        put: bool,
        id: &str,
        draft: &Draft,
    ) -> ScenarioResult<Resource> {
        let response = self.write(ctx, put, id, draft).await?;
        expect_status(&response, 200)?;
        let resource = parse_one(&response.body, self.kind)?;
        ensure(resource.id() == id, || {
            format!("update changed id {} to {}", id, resource.id())
        })?;
        Ok(resource)
    }

    fn check_created(&self, created: &Resource, draft: &Draft) -> ScenarioResult<()> {
        expect_field_count(created, created_field_count(self.kind))?;
        expect_fields(created, &draft.expected_fields())?;
        for flag in self.kind.flag_fields() {
            ensure(matches!(created.field(flag), Some(Value::String(_))), || {
                format!("{} is not serialized as a string: {:?}", flag, created.field(flag))
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Scenario for Crud {
    fn name(&self) -> &str {
        &self.name
    }

    fn resource(&self) -> ResourceKind {
        self.kind
    }

    fn description(&self) -> &str {
        self.check.description()
    }

    async fn setup(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        if self.check.needs_absent_id() {
            remember_absent(ctx, self.kind).await?;
        }
        Ok(())
    }

    async fn run(&self, ctx: &mut ScenarioContext) -> ScenarioResult<()> {
        let kind = self.kind;
        match self.check {
            CrudCheck::List => {
                let items = ctx.list(kind).await?;
                ensure(items.len() >= seeded_minimum(kind), || {
                    format!("expected at least {} {}, got {}", seeded_minimum(kind), kind, items.len())
                })
            }
            CrudCheck::ReadSeed => {
                let seed = ctx.fetch(kind, SEED_ID).await?;
                ensure(seed.id() == SEED_ID, || format!("asked for {}, got {}", SEED_ID, seed.id()))?;
                for attribute in kind.attributes() {
                    ensure(seed.has_field(attribute), || format!("seed lacks {}", attribute))?;
                }
                Ok(())
            }
            CrudCheck::ReadMissing => {
                let missing = ctx.value(MISSING_ID)?.to_string();
                let response = ctx.client().get(&kind.item_path(&missing)).await?;
                expect_error(&response, 404).map(|_| ())
            }
            CrudCheck::CreateJson => {
                let draft = sample_draft(kind);
                let created = ctx.create(&draft).await?;
                self.check_created(&created, &draft)
            }
            CrudCheck::CreateXml => {
                let draft = sample_draft(kind);
                let created = ctx.create_xml(&draft).await?;
                self.check_created(&created, &draft)
            }
            CrudCheck::UpdatePut => {
                let created = ctx.create(&sample_draft(kind)).await?;
                let draft = changed_draft(kind);
                let updated = self.updated(ctx, true, created.id(), &draft).await?;
                expect_fields(&updated, &draft.expected_fields())
            }
            CrudCheck::UpdatePost => {
                let original = sample_draft(kind);
                let created = ctx.create(&original).await?;
                let amendment = Draft::empty(kind).description("amended through POST");
                let updated = self.updated(ctx, false, created.id(), &amendment).await?;
                expect_fields(&updated, &amendment.expected_fields())?;
                ensure(Some(updated.title()) == original.title(), || {
                    format!("POST without title changed it to {:?}", updated.title())
                })
            }
            CrudCheck::PutIdempotent => {
                let created = ctx.create(&sample_draft(kind)).await?;
                let draft = changed_draft(kind);
                let first = self.updated(ctx, true, created.id(), &draft).await?;
                let second = self.updated(ctx, true, created.id(), &draft).await?;
                ensure(first.fields() == second.fields(), || {
                    format!("repeated PUT differs: {:?} vs {:?}", first.fields(), second.fields())
                })
            }
            CrudCheck::ListingRoundTrip => {
                let created = ctx.create(&sample_draft(kind)).await?;
                let listed = ctx
                    .list(kind)
                    .await?
                    .into_iter()
                    .find(|r| r.id() == created.id())
                    .ok_or_else(|| {
                        graphcheck_runner::ScenarioError::assertion(format!(
                            "{} {} missing from listing",
                            kind,
                            created.id()
                        ))
                    })?;
                let single = ctx.fetch(kind, created.id()).await?;
                ensure(listed.fields() == single.fields(), || {
                    format!("listing {:?} differs from read {:?}", listed.fields(), single.fields())
                })
            }
            CrudCheck::DeleteTwice => {
                let created = ctx.create(&sample_draft(kind)).await?;
                let id = created.id().to_string();
                let path = kind.item_path(&id);

                let response = ctx.client().delete(&path).await?;
                expect_status(&response, 200)?;
                expect_empty_body(&response)?;
                ctx.forget(kind, &id);

                let response = ctx.client().delete(&path).await?;
                expect_error(&response, 404)?;
                let response = ctx.client().get(&path).await?;
                expect_error(&response, 404).map(|_| ())
            }
            CrudCheck::DeleteMissing => {
                let missing = ctx.value(MISSING_ID)?.to_string();
                let response = ctx.client().delete(&kind.item_path(&missing)).await?;
                expect_error(&response, 404).map(|_| ())
            }
            CrudCheck::PostMissing | CrudCheck::PutMissing => {
                let missing = ctx.value(MISSING_ID)?.to_string();
                let put = self.check == CrudCheck::PutMissing;
                let response = self.write(ctx, put, &missing, &sample_draft(kind)).await?;
                expect_error(&response, 404).map(|_| ())
            }
        }
    }
}
