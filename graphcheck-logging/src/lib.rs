//! Logging setup for graphcheck
//!
//! All crates log through `tracing`; this crate only decides where the
//! events go and how they are filtered.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
