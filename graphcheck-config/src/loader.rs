//! Configuration loading and environment variable handling

use crate::domains::GraphcheckConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the `GRAPHCHECK` prefix
    pub fn new() -> Self {
        Self {
            prefix: "GRAPHCHECK".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<GraphcheckConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: GraphcheckConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<GraphcheckConfig> {
        let mut config = GraphcheckConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<GraphcheckConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut GraphcheckConfig) -> ConfigResult<()> {
        if let Ok(endpoint) = self.get_env_var("TARGET_ENDPOINT") {
            config.target.endpoint = endpoint;
        }
        if let Some(shutdown) = self.parse_env_var::<bool>("TARGET_SHUTDOWN")? {
            config.target.shutdown_on_exit = shutdown;
        }

        if let Some(seconds) = self.parse_env_var::<u64>("HTTP_TIMEOUT")? {
            config.http.timeout = Duration::from_secs(seconds);
        }
        if let Some(seconds) = self.parse_env_var::<u64>("HTTP_CONNECT_TIMEOUT")? {
            config.http.connect_timeout = Duration::from_secs(seconds);
        }
        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.http.user_agent = user_agent;
        }

        // A single seed drives both kinds of run unless the file says otherwise
        if let Some(seed) = self.parse_env_var::<u64>("SEED")? {
            config.scenarios.seed = Some(seed);
            config.load.seed = Some(seed);
        }
        if let Ok(filter) = self.get_env_var("SCENARIO_FILTER") {
            config.scenarios.filter = Some(filter);
        }
        if let Some(strict) = self.parse_env_var::<bool>("SCENARIO_STRICT")? {
            config.scenarios.strict = strict;
        }

        if let Ok(kind) = self.get_env_var("LOAD_KIND") {
            config.load.kind = kind.parse().map_err(ConfigError::EnvError)?;
        }
        if let Some(objects) = self.parse_env_var::<usize>("LOAD_OBJECTS")? {
            config.load.objects = objects;
        }
        if let Some(interval) = self.parse_env_var::<usize>("LOAD_INTERVAL")? {
            config.load.interval = interval;
        }
        if let Ok(output) = self.get_env_var("LOAD_OUTPUT") {
            config.load.output = Some(PathBuf::from(output));
        }

        if let Ok(level) = self.get_env_var("LOG_LEVEL") {
            config.logging.level = level.parse().map_err(ConfigError::EnvError)?;
        }
        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.logging.format = format.parse().map_err(ConfigError::EnvError)?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }

    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_env_var(name) {
            Ok(raw) => raw
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))),
            Err(_) => Ok(None),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::load::LoadKind;
    use std::io::Write;

    #[test]
    fn test_from_file_with_env_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "target:\n  endpoint: http://127.0.0.1:9000/\nload:\n  objects: 100\n  interval: 10\n"
        )
        .unwrap();

        std::env::set_var("GCTEST_FILE_LOAD_KIND", "todos");
        std::env::set_var("GCTEST_FILE_SEED", "42");

        let config = ConfigLoader::with_prefix("GCTEST_FILE")
            .from_file(file.path())
            .unwrap();

        assert_eq!(config.target.endpoint, "http://127.0.0.1:9000/");
        assert_eq!(config.load.objects, 100);
        assert_eq!(config.load.kind, LoadKind::Todos);
        assert_eq!(config.scenarios.seed, Some(42));
        assert_eq!(config.load.seed, Some(42));

        std::env::remove_var("GCTEST_FILE_LOAD_KIND");
        std::env::remove_var("GCTEST_FILE_SEED");
    }

    #[test]
    fn test_invalid_env_value_is_reported() {
        std::env::set_var("GCTEST_BAD_LOAD_INTERVAL", "often");
        let result = ConfigLoader::with_prefix("GCTEST_BAD").from_env();
        std::env::remove_var("GCTEST_BAD_LOAD_INTERVAL");

        match result {
            Err(ConfigError::EnvError(message)) => {
                assert!(message.contains("GCTEST_BAD_LOAD_INTERVAL"))
            }
            other => panic!("expected env error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        std::env::set_var("GCTEST_VALIDATE_TARGET_ENDPOINT", "localhost");
        let result = ConfigLoader::with_prefix("GCTEST_VALIDATE").from_env();
        std::env::remove_var("GCTEST_VALIDATE_TARGET_ENDPOINT");
        assert!(result.is_err());
    }
}
