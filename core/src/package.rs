use serde::{Deserialize, Serialize};

use crate::ResourceSchema;

/// Serializable bundle of resource schemas.
///
/// A package groups the schemas of one API with version metadata, so it can
/// be shipped as a single JSON file or embedded at build time.
///
/// # Examples
///
/// ```
/// use resource_command_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.name = Some("foreman".into());
/// package.resources.push(ResourceSchema::new("smart_class_parameters"));
/// package.resources.push(ResourceSchema::new("override_values"));
///
/// assert_eq!(package.resource_count(), 2);
/// assert!(package.find_resource("override_values").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaPackage {
    /// Schema contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Package format version (semver string).
    pub version: String,
    /// Optional package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional package description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// API version the schemas were taken from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Resource schemas included in this package.
    #[serde(default)]
    pub resources: Vec<ResourceSchema>,
}

impl SchemaPackage {
    /// Creates an empty package.
    ///
    /// The `schema_version` is automatically set from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION).
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            api_version: None,
            resources: Vec::new(),
        }
    }

    /// Returns the number of resources in this package.
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Finds a resource schema by name.
    pub fn find_resource(&self, name: &str) -> Option<&ResourceSchema> {
        self.resources.iter().find(|r| r.name == name)
    }
}
