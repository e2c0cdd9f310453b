//! Domain-driven configuration for graphcheck
//!
//! Configuration is split by functional domain (target service, HTTP
//! transport, scenario runs, load runs, logging). Every domain has serde
//! defaults, can be overridden from `GRAPHCHECK_*` environment variables and
//! validates itself through [`Validatable`].

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

pub use domains::{
    http::HttpConfig,
    load::{LoadConfig, LoadKind},
    logging::{LogFormat, LogLevel, LoggingConfig},
    scenarios::ScenarioConfig,
    target::TargetConfig,
    GraphcheckConfig,
};

pub use domains::utils::serde_duration;
