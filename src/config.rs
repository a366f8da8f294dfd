use std::path::Path;

use serde::{Deserialize, Serialize};

/// Capacities and limits of a [`Vm`](crate::runtime::vm::Vm).
///
/// Every field has a default, so a YAML file only needs to name the values it
/// overrides:
///
/// ```yaml
/// max_stack: 256
/// locals_per_scope: 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Starting capacity of the token and code buffers. Doubles on growth.
    pub initial_capacity: usize,
    /// Maximum number of values on the operand stack.
    pub max_stack: usize,
    /// Maximum depth of the parser's operator stack within one expression.
    pub max_operators: usize,
    /// Number of indentation levels that get their own scope.
    pub max_scopes: usize,
    /// Slots in each scope's variable table.
    pub locals_per_scope: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_capacity: 64,
            max_stack: 128,
            max_operators: 64,
            max_scopes: 8,
            locals_per_scope: 256,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0} must be greater than zero")]
    Zero(&'static str),
}

impl Config {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("initial_capacity", self.initial_capacity),
            ("max_stack", self.max_stack),
            ("max_operators", self.max_operators),
            ("max_scopes", self.max_scopes),
            ("locals_per_scope", self.locals_per_scope),
        ];

        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::Zero(name)),
            None => Ok(()),
        }
    }
}
