//! Resource kinds and the relations between them

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three resource collections exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Task,
    Category,
    Project,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Task,
        ResourceKind::Category,
        ResourceKind::Project,
    ];

    /// Collection path segment, also the key of a listing body
    pub fn collection(&self) -> &'static str {
        match self {
            ResourceKind::Task => "todos",
            ResourceKind::Category => "categories",
            ResourceKind::Project => "projects",
        }
    }

    /// Root element of the fixed XML schema
    pub fn xml_root(&self) -> &'static str {
        match self {
            ResourceKind::Task => "todo",
            ResourceKind::Category => "category",
            ResourceKind::Project => "project",
        }
    }

    /// Attribute names, excluding `id` and relations
    pub fn attributes(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Task => &["title", "description", "doneStatus"],
            ResourceKind::Category => &["title", "description"],
            ResourceKind::Project => &["title", "description", "completed", "active"],
        }
    }

    /// Fields every response representation must carry
    pub fn required_fields(&self) -> &'static [&'static str] {
        &["id", "title"]
    }

    /// Attributes the service serializes as `"true"`/`"false"` strings
    pub fn flag_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Task => &["doneStatus"],
            ResourceKind::Category => &[],
            ResourceKind::Project => &["completed", "active"],
        }
    }

    /// Relations owned by this kind
    pub fn relations(&self) -> [Relation; 2] {
        match self {
            ResourceKind::Task => [Relation::TaskCategories, Relation::TaskProjects],
            ResourceKind::Category => [Relation::CategoryTasks, Relation::CategoryProjects],
            ResourceKind::Project => [Relation::ProjectTasks, Relation::ProjectCategories],
        }
    }

    pub fn collection_path(&self) -> String {
        self.collection().to_string()
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.collection(), id)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for ResourceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "todos" | "todo" | "task" | "tasks" => Ok(ResourceKind::Task),
            "categories" | "category" => Ok(ResourceKind::Category),
            "projects" | "project" => Ok(ResourceKind::Project),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

/// A relation as seen from its owning side, i.e. one sub-collection endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// `todos/:id/categories`
    TaskCategories,
    /// `todos/:id/tasksof`
    TaskProjects,
    /// `categories/:id/todos`
    CategoryTasks,
    /// `categories/:id/projects`
    CategoryProjects,
    /// `projects/:id/tasks`
    ProjectTasks,
    /// `projects/:id/categories`
    ProjectCategories,
}

impl Relation {
    pub const ALL: [Relation; 6] = [
        Relation::TaskCategories,
        Relation::TaskProjects,
        Relation::CategoryTasks,
        Relation::CategoryProjects,
        Relation::ProjectTasks,
        Relation::ProjectCategories,
    ];

    pub fn owner(&self) -> ResourceKind {
        match self {
            Relation::TaskCategories | Relation::TaskProjects => ResourceKind::Task,
            Relation::CategoryTasks | Relation::CategoryProjects => ResourceKind::Category,
            Relation::ProjectTasks | Relation::ProjectCategories => ResourceKind::Project,
        }
    }

    pub fn target(&self) -> ResourceKind {
        match self {
            Relation::CategoryTasks | Relation::ProjectTasks => ResourceKind::Task,
            Relation::TaskCategories | Relation::ProjectCategories => ResourceKind::Category,
            Relation::TaskProjects | Relation::CategoryProjects => ResourceKind::Project,
        }
    }

    /// Path segment of the sub-collection; also the field name the owner
    /// uses to list its links.
    pub fn segment(&self) -> &'static str {
        match self {
            Relation::TaskCategories => "categories",
            Relation::TaskProjects => "tasksof",
            Relation::CategoryTasks => "todos",
            Relation::CategoryProjects => "projects",
            Relation::ProjectTasks => "tasks",
            Relation::ProjectCategories => "categories",
        }
    }

    /// Key of the listing body returned by `GET owner/:id/segment`
    pub fn listing_key(&self) -> &'static str {
        self.target().collection()
    }

    /// The same pairing seen from the other side
    pub fn reciprocal(&self) -> Relation {
        match self {
            Relation::TaskCategories => Relation::CategoryTasks,
            Relation::CategoryTasks => Relation::TaskCategories,
            Relation::TaskProjects => Relation::ProjectTasks,
            Relation::ProjectTasks => Relation::TaskProjects,
            Relation::CategoryProjects => Relation::ProjectCategories,
            Relation::ProjectCategories => Relation::CategoryProjects,
        }
    }

    pub fn collection_path(&self, owner_id: &str) -> String {
        format!("{}/{}/{}", self.owner().collection(), owner_id, self.segment())
    }

    pub fn item_path(&self, owner_id: &str, target_id: &str) -> String {
        format!("{}/{}", self.collection_path(owner_id), target_id)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/:id/{}", self.owner().collection(), self.segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_paths() {
        assert_eq!(Relation::TaskProjects.collection_path("1"), "todos/1/tasksof");
        assert_eq!(Relation::ProjectTasks.item_path("1", "7"), "projects/1/tasks/7");
        assert_eq!(Relation::TaskProjects.listing_key(), "projects");
        assert_eq!(Relation::ProjectTasks.listing_key(), "todos");
    }

    #[test]
    fn test_reciprocal_is_an_involution() {
        for relation in Relation::ALL {
            let back = relation.reciprocal();
            assert_eq!(back.reciprocal(), relation);
            assert_eq!(back.owner(), relation.target());
            assert_eq!(back.target(), relation.owner());
        }
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("todos".parse::<ResourceKind>().unwrap(), ResourceKind::Task);
        assert_eq!("Project".parse::<ResourceKind>().unwrap(), ResourceKind::Project);
        assert!("widgets".parse::<ResourceKind>().is_err());
    }
}
