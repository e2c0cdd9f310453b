//! Resource model for the todo/category/project graph
//!
//! Pure data and assertion helpers; nothing in this crate performs I/O.
//! Responses keep their raw field maps so that the service's
//! boolean-as-string encoding (`"doneStatus": "false"`) stays visible to the
//! scenarios that assert on it.

pub mod assertions;
pub mod contract;
pub mod draft;
pub mod error;
pub mod kind;
pub mod resource;

pub use assertions::{
    check_head_headers, count_field, expect_fields, field_mismatches, FieldMismatch,
    HeaderShapeError, HEAD_HEADERS,
};
pub use contract::Visibility;
pub use draft::{Draft, FieldValue};
pub use error::ModelError;
pub use kind::{Relation, ResourceKind};
pub use resource::{
    parse, parse_listing, parse_one, BoolString, Category, ErrorBody, Link, Parsed, Project,
    Resource, Task,
};
