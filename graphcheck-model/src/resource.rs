//! Parsed resources and typed views over them

use crate::error::ModelError;
use crate::kind::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A boolean the service serializes as the string `"true"` or `"false"`.
///
/// The string form is the contract under test, so it is kept as-is;
/// `as_bool` is only a convenience for callers that need the meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoolString(String);

impl BoolString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.0.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

impl From<bool> for BoolString {
    fn from(value: bool) -> Self {
        BoolString(value.to_string())
    }
}

/// Reference to a related resource, `{"id": "1"}` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "doneStatus")]
    pub done_status: BoolString,
    #[serde(default)]
    pub categories: Vec<Link>,
    #[serde(default)]
    pub tasksof: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub todos: Vec<Link>,
    #[serde(default)]
    pub projects: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: BoolString,
    pub active: BoolString,
    #[serde(default)]
    pub tasks: Vec<Link>,
    #[serde(default)]
    pub categories: Vec<Link>,
}

/// One resource as returned by the service, fields untouched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    kind: ResourceKind,
    fields: Map<String, Value>,
}

impl Resource {
    /// Wrap a JSON object, checking the fields every kind must carry
    pub fn from_value(kind: ResourceKind, value: Value) -> Result<Self, ModelError> {
        let Value::Object(fields) = value else {
            return Err(ModelError::malformed(kind, "expected a JSON object"));
        };

        for required in kind.required_fields() {
            match fields.get(*required) {
                Some(Value::String(_)) => {}
                Some(other) => {
                    return Err(ModelError::malformed(
                        kind,
                        format!("field {} is not a string: {}", required, other),
                    ))
                }
                None => {
                    return Err(ModelError::malformed(
                        kind,
                        format!("missing required field {}", required),
                    ))
                }
            }
        }

        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        self.text("id").unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.text("title").unwrap_or_default()
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// String value of a field; `None` when absent or not a string
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Ids listed under a relation field; empty when the field is absent
    pub fn relation_ids(&self, relation_field: &str) -> Vec<&str> {
        self.fields
            .get(relation_field)
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(|link| link.get("id").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn to_task(&self) -> Result<Task, ModelError> {
        self.typed(ResourceKind::Task)
    }

    pub fn to_category(&self) -> Result<Category, ModelError> {
        self.typed(ResourceKind::Category)
    }

    pub fn to_project(&self) -> Result<Project, ModelError> {
        self.typed(ResourceKind::Project)
    }

    fn typed<T: serde::de::DeserializeOwned>(&self, expected: ResourceKind) -> Result<T, ModelError> {
        if self.kind != expected {
            return Err(ModelError::malformed(
                expected,
                format!("resource was parsed as {}", self.kind),
            ));
        }
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|e| ModelError::malformed(expected, e.to_string()))
    }
}

/// Result of parsing a response body
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    One(Resource),
    Many(Vec<Resource>),
}

impl Parsed {
    /// Flatten to a list; a single resource becomes a list of one
    pub fn into_vec(self) -> Vec<Resource> {
        match self {
            Parsed::One(resource) => vec![resource],
            Parsed::Many(resources) => resources,
        }
    }
}

/// Parse a body as either one resource of `kind` or a `{"<collection>": [...]}`
/// listing of them.
pub fn parse(raw: &str, kind: ResourceKind) -> Result<Parsed, ModelError> {
    let value: Value = serde_json::from_str(raw)?;

    let is_listing = value
        .as_object()
        .map(|object| object.len() == 1 && object.get(kind.collection()).is_some_and(Value::is_array))
        .unwrap_or(false);

    if is_listing {
        parse_listing_value(value, kind.collection(), kind).map(Parsed::Many)
    } else {
        Resource::from_value(kind, value).map(Parsed::One)
    }
}

/// Parse a body that must be a single resource
pub fn parse_one(raw: &str, kind: ResourceKind) -> Result<Resource, ModelError> {
    let value: Value = serde_json::from_str(raw)?;
    Resource::from_value(kind, value)
}

/// Parse a listing stored under an explicit key. Relation listings are keyed
/// by the target collection, e.g. `todos/1/tasksof` answers `{"projects": [...]}`.
pub fn parse_listing(raw: &str, key: &str, kind: ResourceKind) -> Result<Vec<Resource>, ModelError> {
    let value: Value = serde_json::from_str(raw)?;
    parse_listing_value(value, key, kind)
}

fn parse_listing_value(value: Value, key: &str, kind: ResourceKind) -> Result<Vec<Resource>, ModelError> {
    let Value::Object(mut object) = value else {
        return Err(ModelError::malformed(kind, "expected a JSON object"));
    };
    match object.remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| Resource::from_value(kind, item))
            .collect(),
        Some(_) => Err(ModelError::malformed(kind, format!("{} is not a list", key))),
        None => Err(ModelError::malformed(kind, format!("missing listing key {}", key))),
    }
}

/// Error body shared by 400 and 404 responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "errorMessages")]
    pub error_messages: Vec<String>,
}

impl ErrorBody {
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(raw)?;
        if value.get("errorMessages").is_none() {
            return Err(ModelError::MissingErrorMessages);
        }
        Ok(serde_json::from_value(value)?)
    }
}
