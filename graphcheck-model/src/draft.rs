//! Request payloads for creating and updating resources

use crate::error::ModelError;
use crate::kind::ResourceKind;
use quick_xml::escape::escape;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

const ASCII_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Value of one draft field before rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Sent as a native boolean in JSON; the service echoes it as a string
    Flag(bool),
    /// Relation list, `[{"id": ..}, ..]` in JSON
    Links(Vec<String>),
}

/// An ordered set of fields to send for one resource kind.
///
/// Field order is preserved so XML bodies come out in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    kind: ResourceKind,
    fields: Vec<(String, FieldValue)>,
}

impl Draft {
    pub fn new(kind: ResourceKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            fields: vec![("title".to_string(), FieldValue::Text(title.into()))],
        }
    }

    pub fn task(title: impl Into<String>) -> Self {
        Self::new(ResourceKind::Task, title)
    }

    pub fn category(title: impl Into<String>) -> Self {
        Self::new(ResourceKind::Category, title)
    }

    pub fn project(title: impl Into<String>) -> Self {
        Self::new(ResourceKind::Project, title)
    }

    /// A draft with no fields at all, used to probe required-field handling
    pub fn empty(kind: ResourceKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.with_field("description", FieldValue::Text(description.into()))
    }

    pub fn done_status(self, done: bool) -> Self {
        self.with_field("doneStatus", FieldValue::Flag(done))
    }

    pub fn completed(self, completed: bool) -> Self {
        self.with_field("completed", FieldValue::Flag(completed))
    }

    pub fn active(self, active: bool) -> Self {
        self.with_field("active", FieldValue::Flag(active))
    }

    /// Client-supplied id; the service treats this differently per endpoint
    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_field("id", FieldValue::Text(id.into()))
    }

    pub fn links<I, S>(self, relation_field: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids.into_iter().map(Into::into).collect();
        self.with_field(relation_field, FieldValue::Links(ids))
    }

    /// Set a field, replacing any earlier value with the same name
    pub fn with_field(mut self, name: &str, value: FieldValue) -> Self {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|(n, _)| n != name);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn title(&self) -> Option<&str> {
        match self.get("title") {
            Some(FieldValue::Text(title)) => Some(title),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (name, value) in &self.fields {
            let rendered = match value {
                FieldValue::Text(text) => Value::String(text.clone()),
                FieldValue::Flag(flag) => Value::Bool(*flag),
                FieldValue::Links(ids) => {
                    Value::Array(ids.iter().map(|id| json!({ "id": id })).collect())
                }
            };
            object.insert(name.clone(), rendered);
        }
        Value::Object(object)
    }

    /// Render as `<todo><title>..</title>..</todo>`. Relation lists have no
    /// representation in the service's XML schema.
    pub fn to_xml(&self) -> Result<String, ModelError> {
        let root = self.kind.xml_root();
        let mut xml = format!("<{}>", root);
        for (name, value) in &self.fields {
            let text = match value {
                FieldValue::Text(text) => escape(text.as_str()).into_owned(),
                FieldValue::Flag(flag) => flag.to_string(),
                FieldValue::Links(_) => {
                    return Err(ModelError::UnsupportedXmlField { field: name.clone() })
                }
            };
            xml.push_str(&format!("<{name}>{text}</{name}>"));
        }
        xml.push_str(&format!("</{}>", root));
        Ok(xml)
    }

    /// Attribute values a resource created from this draft must report, in
    /// the service's string form. `id` and relation lists are not included.
    pub fn expected_fields(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter(|(name, _)| name != "id")
            .filter_map(|(name, value)| match value {
                FieldValue::Text(text) => Some((name.clone(), text.clone())),
                FieldValue::Flag(flag) => Some((name.clone(), flag.to_string())),
                FieldValue::Links(_) => None,
            })
            .collect()
    }

    /// Synthetic payload: 10-letter title, 20-letter description and random
    /// flags for the kinds that have them.
    pub fn random<R: Rng + ?Sized>(kind: ResourceKind, rng: &mut R) -> Self {
        let draft = Self::new(kind, random_letters(rng, 10)).description(random_letters(rng, 20));
        match kind {
            ResourceKind::Task => draft.done_status(rng.random_bool(0.5)),
            ResourceKind::Category => draft,
            ResourceKind::Project => draft
                .completed(rng.random_bool(0.5))
                .active(rng.random_bool(0.5)),
        }
    }
}

fn random_letters<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ASCII_LETTERS[rng.random_range(0..ASCII_LETTERS.len())] as char)
        .collect()
}
