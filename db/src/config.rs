//! CLI configuration file.
//!
//! Defines the YAML-serializable settings for the `sc-param` binary: where
//! schemas come from, where canned responses live, how results are printed
//! and how verbose logging is.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! schemas:
//!   - /etc/sc-param/schemas
//!   - /etc/sc-param/foreman.json
//! fixtures: /etc/sc-param/fixtures.yaml
//! output: yaml
//! log_filter: resource_command_core=debug
//! per_page: 50
//! ```

use std::fmt;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How command results are printed.
///
/// # Examples
///
/// ```
/// use resource_command_db::OutputFormat;
///
/// assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
/// assert!("xml".parse::<OutputFormat>().is_err());
/// assert_eq!(OutputFormat::default().to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{other}' (expected json or yaml)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

/// Settings for the command-line tool.
///
/// Every field is optional in the file; command-line flags take precedence.
///
/// # Examples
///
/// ```no_run
/// use resource_command_db::CliConfig;
///
/// let config = CliConfig::load("sc-param.yml").unwrap();
/// for source in &config.schemas {
///     println!("schema source: {}", source.display());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Configuration format version (e.g., `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// Schema directories or bundles, tried in order.
    #[serde(default)]
    pub schemas: Vec<PathBuf>,
    /// File of canned responses; without one, requests are echoed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixtures: Option<PathBuf>,
    /// Result format.
    #[serde(default)]
    pub output: OutputFormat,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    /// Default page size for list commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            schemas: Vec::new(),
            fixtures: None,
            output: OutputFormat::default(),
            log_filter: None,
            per_page: None,
        }
    }
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::DatabaseError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
schemas:
  - /etc/sc-param/schemas
  - /etc/sc-param/foreman.json
fixtures: /etc/sc-param/fixtures.yaml
output: yaml
log_filter: resource_command_core=debug
per_page: 50
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: CliConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.schemas.len(), 2);
        assert_eq!(
            config.fixtures,
            Some(PathBuf::from("/etc/sc-param/fixtures.yaml"))
        );
        assert_eq!(config.output, OutputFormat::Yaml);
        assert_eq!(config.log_filter.as_deref(), Some("resource_command_core=debug"));
        assert_eq!(config.per_page, Some(50));
    }

    #[test]
    fn test_deserialize_empty_document_uses_defaults() {
        let config: CliConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        let result: std::result::Result<CliConfig, _> = serde_yaml::from_str("output: xml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let original: CliConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = CliConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
