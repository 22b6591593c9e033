//! Configuration management for the transform engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (transform.toml)
//! - Environment variables (TRANSFORM__*)
//!
//! ## Example config file (transform.toml):
//! ```toml
//! [parse]
//! default_view = "default"
//! strict_unknown_keys = true
//! strict_aggregate_keys = false
//!
//! [serialize]
//! default_view = "web"
//! output_format = "pretty"
//!
//! [limits]
//! max_depth = 64
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::schema::DEFAULT_VIEW;
use crate::transform::DEFAULT_MAX_DEPTH;

/// Main configuration for the transform engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Parse settings
    #[serde(default)]
    pub parse: ParseConfig,

    /// Serialize settings
    #[serde(default)]
    pub serialize: SerializeConfig,

    /// Resource limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Parse configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseConfig {
    /// View used when the caller names none
    #[serde(default = "default_view")]
    pub default_view: String,

    /// Reject wire keys no field declares
    #[serde(default)]
    pub strict_unknown_keys: bool,

    /// Report every unrecognized key in one error instead of the first
    #[serde(default)]
    pub strict_aggregate_keys: bool,
}

/// Serialize configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializeConfig {
    /// View used when the caller names none
    #[serde(default = "default_view")]
    pub default_view: String,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    #[default]
    Compact,
}

/// Limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Deepest nesting of objects a single call will follow
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_view() -> String {
    DEFAULT_VIEW.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            default_view: default_view(),
            strict_unknown_keys: false,
            strict_aggregate_keys: false,
        }
    }
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            default_view: default_view(),
            output_format: OutputFormat::default(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl TransformConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "transform.toml",
            ".transform.toml",
            "config/transform.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "transform") {
            let xdg_config = config_dir.config_dir().join("transform.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // TRANSFORM__PARSE__STRICT_UNKNOWN_KEYS=true
        builder = builder.add_source(
            Environment::with_prefix("TRANSFORM")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Problems that would make the configuration unusable
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.parse.default_view.trim().is_empty() {
            problems.push("parse.default_view must not be empty".to_string());
        }
        if self.serialize.default_view.trim().is_empty() {
            problems.push("serialize.default_view must not be empty".to_string());
        }
        if self.limits.max_depth == 0 {
            problems.push("limits.max_depth must be at least 1".to_string());
        }
        problems
    }
}
