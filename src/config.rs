//! Configuration for the type compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (jsonotron.toml)
//! - Environment variables (JSONOTRON__*)
//!
//! ## Example config file (jsonotron.toml):
//! ```toml
//! domain = "https://types.example.com"
//!
//! [documentation]
//! enabled = true
//!
//! [engine]
//! validate_formats = true
//! parallel = true
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

pub const DEFAULT_DOMAIN: &str = "https://jsonotron.org";

/// Main configuration for a compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Prefix of every emitted schema `$id`
    #[serde(default = "default_domain")]
    pub domain: String,

    #[serde(default)]
    pub documentation: DocumentationConfig,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// Documentation completeness checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentationConfig {
    /// Report missing summaries as warnings
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Validation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Apply `format` keywords, including custom formats
    #[serde(default = "default_true")]
    pub validate_formats: bool,

    /// Compile and verify types on the rayon thread pool
    #[serde(default = "default_true")]
    pub parallel: bool,
}

fn default_domain() -> String {
    DEFAULT_DOMAIN.to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            documentation: DocumentationConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_formats: true,
            parallel: true,
        }
    }
}

impl CompilerConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = ["jsonotron.toml", ".jsonotron.toml", "config/jsonotron.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("org", "jsonotron", "jsonotron") {
            let xdg_config = config_dir.config_dir().join("jsonotron.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // JSONOTRON__ENGINE__PARALLEL=false
        builder = builder.add_source(
            Environment::with_prefix("JSONOTRON")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }
}
