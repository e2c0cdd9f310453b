//! Cross-resource visibility rules of the reference service
//!
//! Relations created through one sub-collection endpoint are not always
//! visible from the other side. Only the task/project pairing is kept in
//! sync; every other reverse listing stays empty. Scenarios assert these
//! facts as they are rather than the symmetric behaviour a reader of the
//! API docs would expect.

use crate::kind::Relation;
use serde::Serialize;

/// Whether a link made through `relation` shows up from the reciprocal side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Mirrored,
    Absent,
}

impl Relation {
    pub fn reciprocal_visibility(&self) -> Visibility {
        match self {
            Relation::TaskProjects | Relation::ProjectTasks => Visibility::Mirrored,
            Relation::TaskCategories
            | Relation::CategoryTasks
            | Relation::CategoryProjects
            | Relation::ProjectCategories => Visibility::Absent,
        }
    }

    /// Relations whose missing reverse link contradicts the documented API,
    /// so the catalog pairs the observed assertion with a compliant one.
    pub fn is_documented_discrepancy(&self) -> bool {
        matches!(self, Relation::TaskCategories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_is_symmetric_per_pair() {
        for relation in Relation::ALL {
            assert_eq!(
                relation.reciprocal_visibility(),
                relation.reciprocal().reciprocal_visibility()
            );
        }
    }

    #[test]
    fn test_only_task_project_is_mirrored() {
        let mirrored: Vec<Relation> = Relation::ALL
            .into_iter()
            .filter(|r| r.reciprocal_visibility() == Visibility::Mirrored)
            .collect();
        assert_eq!(mirrored, vec![Relation::TaskProjects, Relation::ProjectTasks]);
        assert!(Relation::TaskCategories.is_documented_discrepancy());
    }
}
