use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Translator configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Prefix stripped from count-operation field names (`CountPerson` → `Person`)
    #[validate(length(
        min = 1,
        max = 32,
        message = "Count prefix must be between 1 and 32 characters"
    ))]
    pub count_prefix: String,

    /// Whether declared auth scopes are enforced
    pub auth_scopes: bool,

    /// Whether unknown arguments on read fields are rejected (otherwise ignored)
    pub strict_arguments: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            count_prefix: "Count".to_string(),
            auth_scopes: false,
            strict_arguments: true,
        }
    }
}

impl TranslatorConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            count_prefix: env::var("CYPHERGEN_COUNT_PREFIX").unwrap_or_else(|_| "Count".to_string()),
            auth_scopes: parse_env_var("CYPHERGEN_AUTH_SCOPES", "false")?,
            strict_arguments: parse_env_var("CYPHERGEN_STRICT_ARGUMENTS", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Merge CLI overrides: an explicit prefix replaces ours, `auth_scopes`
    /// can only be switched on.
    pub fn merge_cli(&mut self, cli: &CliConfig) -> Result<(), ConfigError> {
        if let Some(prefix) = &cli.count_prefix {
            self.count_prefix = prefix.clone();
        }
        self.auth_scopes |= cli.auth_scopes;
        self.validate()?;
        Ok(())
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub count_prefix: Option<String>,
    pub auth_scopes: bool,
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
