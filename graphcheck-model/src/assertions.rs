//! Helpers scenarios use to compare responses with expectations

use crate::resource::Resource;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Header set a HEAD response must carry, no more and no less
pub const HEAD_HEADERS: [&str; 4] = ["date", "content-type", "transfer-encoding", "server"];

/// One field whose observed value differs from the expected one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: String,
    pub expected: String,
    pub actual: Option<String>,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected {:?}, got {:?}",
                self.field, self.expected, actual
            ),
            None => write!(f, "{}: expected {:?}, field missing", self.field, self.expected),
        }
    }
}

/// Compare every expected field against the resource. Values are compared as
/// the service prints them, so `"false"` never equals a JSON `false`.
pub fn field_mismatches(
    resource: &Resource,
    expected: &BTreeMap<String, String>,
) -> Vec<FieldMismatch> {
    expected
        .iter()
        .filter_map(|(field, want)| {
            let actual = resource.field(field).map(render_value);
            match &actual {
                Some(got) if got == want => None,
                _ => Some(FieldMismatch {
                    field: field.clone(),
                    expected: want.clone(),
                    actual,
                }),
            }
        })
        .collect()
}

pub fn expect_fields(resource: &Resource, expected: &BTreeMap<String, String>) -> bool {
    field_mismatches(resource, expected).is_empty()
}

/// Number of resources whose `field` equals `value`
pub fn count_field(resources: &[Resource], field: &str, value: &str) -> usize {
    resources
        .iter()
        .filter(|r| r.text(field) == Some(value))
        .count()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Header names that deviate from [`HEAD_HEADERS`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderShapeError {
    pub missing: Vec<String>,
    pub unexpected: Vec<String>,
}

impl fmt::Display for HeaderShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "header shape mismatch: missing [{}], unexpected [{}]",
            self.missing.join(", "),
            self.unexpected.join(", ")
        )
    }
}

impl std::error::Error for HeaderShapeError {}

/// Check a HEAD response's header names. Names compare case-insensitively and
/// duplicates count once.
pub fn check_head_headers<I, S>(names: I) -> Result<(), HeaderShapeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let seen: BTreeSet<String> = names
        .into_iter()
        .map(|name| name.as_ref().to_ascii_lowercase())
        .collect();
    let wanted: BTreeSet<String> = HEAD_HEADERS.iter().map(|h| h.to_string()).collect();

    let missing: Vec<String> = wanted.difference(&seen).cloned().collect();
    let unexpected: Vec<String> = seen.difference(&wanted).cloned().collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(HeaderShapeError {
            missing,
            unexpected,
        })
    }
}
