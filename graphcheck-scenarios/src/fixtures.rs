//! Fixture facts and payloads shared by the catalog

use graphcheck_model::{Draft, ResourceKind};

/// Context key under which `setup` stores an id known not to exist
pub(crate) const MISSING_ID: &str = "missing_id";

/// Id of the first seeded resource of every kind
pub(crate) const SEED_ID: &str = "1";

/// How many resources of each kind the service starts with
pub(crate) fn seeded_minimum(kind: ResourceKind) -> usize {
    match kind {
        ResourceKind::Task | ResourceKind::Category => 2,
        ResourceKind::Project => 1,
    }
}

/// Number of fields a freshly created resource reports: its id plus every
/// attribute. Empty relation lists are left out of the body.
pub(crate) fn created_field_count(kind: ResourceKind) -> usize {
    kind.attributes().len() + 1
}

pub(crate) fn sample_draft(kind: ResourceKind) -> Draft {
    match kind {
        ResourceKind::Task => Draft::task("Watch 409 recording")
            .description("watch thursday recording")
            .done_status(false),
        ResourceKind::Category => Draft::category("Errands").description("weekend chores"),
        ResourceKind::Project => Draft::project("Semester project")
            .description("part one")
            .completed(false)
            .active(true),
    }
}

/// A full replacement for [`sample_draft`] with every attribute changed
pub(crate) fn changed_draft(kind: ResourceKind) -> Draft {
    match kind {
        ResourceKind::Task => Draft::task("Lecture watched")
            .description("notes taken")
            .done_status(true),
        ResourceKind::Category => Draft::category("Chores").description("every saturday"),
        ResourceKind::Project => Draft::project("Semester project, final")
            .description("part two")
            .completed(true)
            .active(false),
    }
}

/// Store an id of `kind` that is guaranteed absent under [`MISSING_ID`]
pub(crate) async fn remember_absent(
    ctx: &mut graphcheck_runner::ScenarioContext,
    kind: ResourceKind,
) -> graphcheck_runner::ScenarioResult<()> {
    let id = ctx.absent_id(kind).await?;
    ctx.set(MISSING_ID, id);
    Ok(())
}
