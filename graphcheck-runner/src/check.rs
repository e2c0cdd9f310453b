//! Assertion helpers returning [`ScenarioError`]s

use crate::error::{ScenarioError, ScenarioResult};
use graphcheck_http::RawResponse;
use graphcheck_model::{check_head_headers, field_mismatches, ErrorBody, Resource};
use std::collections::BTreeMap;

const BODY_PREVIEW: usize = 200;

pub fn ensure(condition: bool, detail: impl FnOnce() -> String) -> ScenarioResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::Assertion(detail()))
    }
}

pub fn expect_status(response: &RawResponse, expected: u16) -> ScenarioResult<()> {
    if response.status == expected {
        return Ok(());
    }
    Err(ScenarioError::UnexpectedStatus {
        expected,
        actual: response.status,
        body: preview(&response.body),
    })
}

/// Status plus a non-empty `errorMessages` list
pub fn expect_error(response: &RawResponse, expected: u16) -> ScenarioResult<ErrorBody> {
    expect_status(response, expected)?;
    let body = ErrorBody::parse(&response.body)?;
    ensure(!body.error_messages.is_empty(), || {
        "errorMessages is empty".to_string()
    })?;
    Ok(body)
}

pub fn expect_empty_body(response: &RawResponse) -> ScenarioResult<()> {
    ensure(response.body.trim().is_empty(), || {
        format!("expected an empty body, got {}", preview(&response.body))
    })
}

pub fn expect_fields(resource: &Resource, expected: &BTreeMap<String, String>) -> ScenarioResult<()> {
    let mismatches = field_mismatches(resource, expected);
    if mismatches.is_empty() {
        return Ok(());
    }
    let detail: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
    Err(ScenarioError::Assertion(format!(
        "{} {}: {}",
        resource.kind(),
        resource.id(),
        detail.join("; ")
    )))
}

pub fn expect_field_count(resource: &Resource, expected: usize) -> ScenarioResult<()> {
    ensure(resource.field_count() == expected, || {
        let names: Vec<&str> = resource.fields().keys().map(String::as_str).collect();
        format!(
            "expected {} fields, got {} ({})",
            expected,
            resource.field_count(),
            names.join(", ")
        )
    })
}

pub fn expect_head_shape(response: &RawResponse) -> ScenarioResult<()> {
    expect_status(response, 200)?;
    check_head_headers(response.header_names())?;
    Ok(())
}

fn preview(body: &str) -> String {
    if body.len() <= BODY_PREVIEW {
        return body.to_string();
    }
    let mut end = BODY_PREVIEW;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
