//! Configuration management for the tablet catalog
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (tablets.toml)
//! - Environment variables (TABLETS__*)
//!
//! ## Example config file (tablets.toml):
//! ```toml
//! [import]
//! array_property = "DrawingTablets"
//! require_brand_key = true
//!
//! [export]
//! include_calculated = false
//! include_empty = false
//! output_format = "pretty"
//!
//! [audit]
//! non_display_type = "Pen Tablet"
//!
//! [display]
//! imperial_hints = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::audit::{Auditor, DEFAULT_NON_DISPLAY_TYPE};
use crate::error::Result;
use crate::export::{ExportOptions, EXPORT_ARRAY_PROPERTY};

/// File name searched for in the working directory and the XDG config dir
pub const CONFIG_FILE_NAME: &str = "tablets.toml";

/// Main configuration for the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Import gate settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Auditor settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Presentation settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Import configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Property of a wrapping object that holds the record array
    #[serde(default = "default_array_property")]
    pub array_property: String,

    /// Reject files whose first record has no brand-like key
    #[serde(default = "default_true")]
    pub require_brand_key: bool,
}

/// Export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write calculated fields too
    #[serde(default)]
    pub include_calculated: bool,

    /// Write empty and missing fields as ""
    #[serde(default)]
    pub include_empty: bool,

    /// Output format (pretty or compact)
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Auditor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Type label of tablets without a screen
    #[serde(default = "default_non_display_type")]
    pub non_display_type: String,
}

/// Presentation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Show imperial conversions next to metric values
    #[serde(default = "default_true")]
    pub imperial_hints: bool,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_array_property() -> String {
    EXPORT_ARRAY_PROPERTY.to_string()
}

fn default_non_display_type() -> String {
    DEFAULT_NON_DISPLAY_TYPE.to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            array_property: default_array_property(),
            require_brand_key: true,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_calculated: false,
            include_empty: false,
            output_format: OutputFormat::Pretty,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            non_display_type: default_non_display_type(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { imperial_hints: true }
    }
}

impl ExportConfig {
    /// Projection options for the exporter
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            include_calculated: self.include_calculated,
            include_empty: self.include_empty,
            compact: self.output_format == OutputFormat::Compact,
        }
    }
}

impl AuditConfig {
    pub fn auditor(&self) -> Auditor {
        Auditor::new(self.non_display_type.clone())
    }
}

impl CatalogConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["tablets.toml", ".tablets.toml", "config/tablets.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(xdg_config) = Self::user_config_path() {
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // TABLETS__EXPORT__INCLUDE_EMPTY=true and friends
        builder = builder.add_source(
            Environment::with_prefix("TABLETS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Per-user config file location, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "tablets", "tablet-catalog")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.import.array_property, "DrawingTablets");
        assert!(config.import.require_brand_key);
        assert_eq!(config.audit.non_display_type, "Pen Tablet");
        assert!(config.display.imperial_hints);
        assert_eq!(config.export.options(), ExportOptions::default());
    }

    #[test]
    fn test_serialize_config() {
        let config = CatalogConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[import]"));
        assert!(toml_str.contains("[export]"));
        assert!(toml_str.contains("[audit]"));
        assert!(toml_str.contains("[display]"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");

        let mut config = CatalogConfig::default();
        config.export.include_calculated = true;
        config.export.output_format = OutputFormat::Compact;
        config.audit.non_display_type = "Graphics Tablet".to_string();
        config.save(&path).unwrap();

        let loaded = CatalogConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.export, config.export);
        assert_eq!(loaded.audit, config.audit);
        assert!(loaded.export.options().compact);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[display]\nimperial_hints = false\n").unwrap();

        let loaded = CatalogConfig::load_from(Some(&path)).unwrap();
        assert!(!loaded.display.imperial_hints);
        assert_eq!(loaded.import, ImportConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CatalogConfig::load_from(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
