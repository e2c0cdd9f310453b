//! HTTP client adapter for graphcheck
//!
//! Issues GET/HEAD/POST/PUT/DELETE against the configured base endpoint over
//! one pooled session. A non-2xx status is returned as data; only an
//! unreachable target is treated as a failure of the adapter itself.

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

pub use client::{HttpClient, RawResponse, RestClient};
pub use config::HttpConfig;
pub use errors::HttpError;
pub use types::{HttpMethod, HttpMethodError, Payload};

pub use reqwest::header::HeaderMap;
