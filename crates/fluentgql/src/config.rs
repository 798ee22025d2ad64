//! Schema configuration.
//!
//! Execution limits applied when a schema is assembled. The configuration
//! is read from a TOML document with the keys at the top level. Keys under
//! a table header are not read.
//!
//! # Example Configuration
//!
//! ```toml
//! max_depth = 10
//! max_complexity = 200
//! introspection = false
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Execution limits for an assembled schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Maximum query depth allowed.
    /// Default: 15
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    /// Default: 500
    #[serde(default = "default_max_complexity")]
    pub max_complexity: usize,

    /// Enable introspection queries.
    /// Default: true
    #[serde(default = "default_introspection")]
    pub introspection: bool,
}

fn default_max_depth() -> usize {
    15
}

fn default_max_complexity() -> usize {
    500
}

fn default_introspection() -> bool {
    true
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_complexity: default_max_complexity(),
            introspection: default_introspection(),
        }
    }
}

impl SchemaConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or fails
    /// [`validate`](Self::validate).
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        let config: Self = toml::from_str(source).map_err(|e| SchemaError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a limit is zero.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.max_depth == 0 {
            return Err(SchemaError::config("max_depth must be > 0"));
        }
        if self.max_complexity == 0 {
            return Err(SchemaError::config("max_complexity must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_max_depth() {
        let config = SchemaConfig {
            max_depth: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_invalid_max_complexity() {
        let config = SchemaConfig {
            max_complexity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        let config = SchemaConfig::from_toml_str(
            r#"
            max_depth = 20
            introspection = false
        "#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 20);
        assert_eq!(config.max_complexity, 500);
        assert!(!config.introspection);
    }

    #[test]
    fn test_documented_example_parses() {
        let config = SchemaConfig::from_toml_str(
            r#"
            max_depth = 10
            max_complexity = 200
            introspection = false
        "#,
        )
        .unwrap();
        assert_eq!(
            config,
            SchemaConfig {
                max_depth: 10,
                max_complexity: 200,
                introspection: false,
            }
        );
    }

    #[test]
    fn test_nested_table_is_not_read() {
        let config = SchemaConfig::from_toml_str("[graphql]\nmax_depth = 3").unwrap();
        assert_eq!(config, SchemaConfig::default());
    }

    #[test]
    fn test_toml_with_zero_limit_is_rejected() {
        assert!(SchemaConfig::from_toml_str("max_complexity = 0").is_err());
        assert!(SchemaConfig::from_toml_str("max_depth = \"deep\"").is_err());
    }
}
