//! Matching configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is valid.
//!
//! ```toml
//! page_size = 100
//! max_candidate_orders = 500
//! one_to_one = true
//! one_to_many = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for one [`OrdersGraph`](crate::OrdersGraph) search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Documents per candidate page
    pub page_size: usize,
    /// Cap on unique candidate orders loaded per search
    pub max_candidate_orders: Option<usize>,
    /// Run the one-to-one search
    pub one_to_one: bool,
    /// Run the one-to-many search
    pub one_to_many: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_candidate_orders: None,
            one_to_one: true,
            one_to_many: true,
        }
    }
}

impl MatchingConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.max_candidate_orders == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_candidate_orders".to_string(),
                message: "must be greater than 0 when set".to_string(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
