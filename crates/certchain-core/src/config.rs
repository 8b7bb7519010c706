// Registry configuration
//
// Loaded from TOML. The registry owner is fixed when the registry is built
// and cannot be changed afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use certchain_error::{ConfigError, ConfigResult};
use certchain_types::Address;

/// Registry configuration
///
/// Every field except `registry_owner` may be omitted from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Collection name
    #[serde(default = "default_name")]
    pub name: String,
    /// Collection symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Display decimals; records are indivisible
    #[serde(default)]
    pub decimals: u8,
    /// Identity holding records in escrow during certification
    pub registry_owner: Address,
    /// Default tracing filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,
}

fn default_name() -> String {
    "CertChain".to_string()
}

fn default_symbol() -> String {
    "CRT".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            symbol: default_symbol(),
            decimals: 0,
            registry_owner: Address::from("registry-owner"),
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

impl RegistryConfig {
    /// Default configuration with the given registry owner
    pub fn with_owner(registry_owner: impl Into<Address>) -> Self {
        Self {
            registry_owner: registry_owner.into(),
            ..Self::default()
        }
    }

    /// Parse configuration from a TOML string and validate it
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: RegistryConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file
    pub fn to_toml_file(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check every field holds a usable value
    pub fn validate(&self) -> ConfigResult<()> {
        if self.registry_owner.as_str().trim().is_empty() || self.registry_owner.is_zero() {
            return Err(ConfigError::InvalidOwner(format!(
                "`{}` cannot own the registry",
                self.registry_owner
            )));
        }
        if self.name.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "symbol",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
