//! Schema database loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaDatabase`] for in-memory schema lookup and
//! [`DatabaseBuilder`] for constructing a database from multiple sources with
//! automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use resource_command_db::SchemaDatabase;
//!
//! // Load from a directory of JSON or YAML resource schema files
//! let db = SchemaDatabase::from_dir("schemas/").unwrap();
//! assert!(db.get("smart_class_parameters").is_some());
//!
//! // Load from a single SchemaPackage bundle
//! let db = SchemaDatabase::from_bundle("foreman.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let db = SchemaDatabase::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("foreman.json")
//!     .build()
//!     .unwrap();
//! ```
//!
//! Every schema is structurally validated on load.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use resource_command_core::{
    ResourceSchema, SCHEMA_CONTRACT_VERSION, SchemaError, SchemaPackage, SchemaProvider,
    validate_package, validate_schema,
};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{DatabaseError, Result};

/// Describes where a [`SchemaDatabase`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseSource {
    /// Loaded from a directory of individual resource schema files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaPackage`] file.
    Bundle(PathBuf),
    /// Loaded from a package compiled into the binary.
    Embedded,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<DatabaseSource>),
}

/// In-memory collection of resource schemas with O(1) lookup by name.
///
/// # Examples
///
/// ```
/// use resource_command_core::SchemaProvider;
/// use resource_command_db::SchemaDatabase;
///
/// let db = SchemaDatabase::from_json_str(
///     r#"{"version": "1.0.0", "resources": [{"name": "hosts"}]}"#,
/// )
/// .unwrap();
/// assert_eq!(db.len(), 1);
/// assert!(db.schema("hosts").is_ok());
/// assert!(db.schema("domains").is_err());
/// ```
#[derive(Debug)]
pub struct SchemaDatabase {
    schemas: HashMap<String, ResourceSchema>,
    source: DatabaseSource,
}

impl SchemaDatabase {
    /// Returns a new [`DatabaseBuilder`] for configuring a fallback chain.
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::new()
    }

    /// Loads schemas from a directory of `*.json`, `*.yaml` and `*.yml`
    /// files, one [`ResourceSchema`] per file. Other files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the directory or a file cannot
    /// be read, a parse error for malformed files, and
    /// [`DatabaseError::InvalidSchema`] when a schema is structurally
    /// invalid or two files declare the same resource.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            files.push(entry?.path());
        }
        files.sort();

        let mut package = SchemaPackage::new(SCHEMA_CONTRACT_VERSION);
        for file in &files {
            if let Some(schema) = read_document::<ResourceSchema>(file)? {
                debug!(path = %file.display(), resource = %schema.name, "Read schema file");
                package.resources.push(schema);
            }
        }

        Self::from_package(package, DatabaseSource::Directory(path.to_path_buf()))
    }

    /// Loads schemas from a single [`SchemaPackage`] file (JSON unless the
    /// extension says YAML).
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IoError`] if the file cannot be read, a
    /// parse error if it is malformed, or [`DatabaseError::InvalidSchema`].
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let package: SchemaPackage = if is_yaml(path) {
            serde_yaml::from_str(&text)?
        } else {
            serde_json::from_str(&text)?
        };

        Self::from_package(package, DatabaseSource::Bundle(path.to_path_buf()))
    }

    /// Loads schemas from package JSON held in memory, typically text
    /// compiled into the binary with `include_str!`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::JsonError`] if parsing fails, or
    /// [`DatabaseError::InvalidSchema`].
    pub fn from_json_str(text: &str) -> Result<Self> {
        let package: SchemaPackage = serde_json::from_str(text)?;
        Self::from_package(package, DatabaseSource::Embedded)
    }

    /// Builds a database from an already parsed package.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidSchema`] for the first structural
    /// problem found.
    pub fn from_package(package: SchemaPackage, source: DatabaseSource) -> Result<Self> {
        if let Some(error) = validate_package(&package).into_iter().next() {
            return Err(DatabaseError::InvalidSchema {
                origin: describe(&source),
                error,
            });
        }

        let schemas = package
            .resources
            .into_iter()
            .map(|schema| (schema.name.clone(), schema))
            .collect::<HashMap<_, _>>();

        debug!(source = %describe(&source), resources = schemas.len(), "Loaded schemas");
        Ok(Self { schemas, source })
    }

    /// Looks up a schema by resource name.
    pub fn get(&self, resource: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource)
    }

    /// Inserts a schema, replacing any existing entry for the same resource.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::InvalidSchema`] if the schema is
    /// structurally invalid; the database is left unchanged.
    pub fn insert(&mut self, schema: ResourceSchema) -> Result<()> {
        if let Some(error) = validate_schema(&schema).into_iter().next() {
            return Err(DatabaseError::InvalidSchema {
                origin: schema.name.clone(),
                error,
            });
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Returns `true` if the database contains a schema for `resource`.
    pub fn contains(&self, resource: &str) -> bool {
        self.schemas.contains_key(resource)
    }

    /// Returns the number of schemas in the database.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if the database contains no schemas.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns an iterator over resource names.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(|s| s.as_str())
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &DatabaseSource {
        &self.source
    }
}

impl SchemaProvider for SchemaDatabase {
    fn schema(&self, resource: &str) -> std::result::Result<&ResourceSchema, SchemaError> {
        self.get(resource)
            .ok_or_else(|| SchemaError::ResourceNotFound(resource.to_string()))
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Parses a JSON or YAML file; `None` for any other extension.
fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let ext = path.extension().and_then(|e| e.to_str());
    if !matches!(ext, Some("json") | Some("yaml") | Some("yml")) {
        return Ok(None);
    }

    let text = std::fs::read_to_string(path)?;
    let doc = if is_yaml(path) {
        serde_yaml::from_str(&text)?
    } else {
        serde_json::from_str(&text)?
    };
    Ok(Some(doc))
}

fn describe(source: &DatabaseSource) -> String {
    match source {
        DatabaseSource::Directory(path) | DatabaseSource::Bundle(path) => {
            path.display().to_string()
        }
        DatabaseSource::Embedded => "embedded schemas".to_string(),
        DatabaseSource::Multiple(sources) => sources
            .iter()
            .map(describe)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Builder for constructing a [`SchemaDatabase`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`DatabaseError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use resource_command_db::SchemaDatabase;
///
/// let db = SchemaDatabase::builder()
///     .from_dir("/etc/sc-param/schemas/")
///     .with_embedded(r#"{"version": "1.0.0", "resources": []}"#)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DatabaseBuilder {
    sources: Vec<DatabaseSource>,
    embedded: Option<&'static str>,
}

impl DatabaseBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of resource schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DatabaseSource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaPackage`] bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(DatabaseSource::Bundle(path.into()));
        self
    }

    /// Adds a path as a source, as a directory or a bundle depending on what
    /// it points at.
    pub fn from_path(self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.is_dir() {
            self.from_dir(path)
        } else {
            self.from_bundle(path)
        }
    }

    /// Adds package JSON compiled into the binary as a source.
    pub fn with_embedded(mut self, text: &'static str) -> Self {
        self.embedded = Some(text);
        self.sources.push(DatabaseSource::Embedded);
        self
    }

    /// Attempts to load schemas from configured sources in order.
    ///
    /// Returns the first successfully loaded database. If all sources fail,
    /// returns [`DatabaseError::NoSourcesAvailable`].
    pub fn build(&self) -> Result<SchemaDatabase> {
        if self.sources.is_empty() {
            return Err(DatabaseError::NoSourcesAvailable);
        }

        for source in &self.sources {
            let result = match source {
                DatabaseSource::Directory(path) => SchemaDatabase::from_dir(path),
                DatabaseSource::Bundle(path) => SchemaDatabase::from_bundle(path),
                DatabaseSource::Embedded => match self.embedded {
                    Some(text) => SchemaDatabase::from_json_str(text),
                    None => Err(DatabaseError::NoSourcesAvailable),
                },
                DatabaseSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut db) => {
                    if self.sources.len() > 1 {
                        db.source = DatabaseSource::Multiple(self.sources.clone());
                    }
                    return Ok(db);
                }
                Err(err) => {
                    warn!(source = %describe(source), error = %err, "Schema source failed");
                }
            }
        }

        Err(DatabaseError::NoSourcesAvailable)
    }
}
