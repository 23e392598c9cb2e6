//! Process-wide schema cache.

use std::sync::OnceLock;

use resource_command_core::{ResourceSchema, SchemaError, SchemaProvider};
use tracing::info;

use crate::loader::{DatabaseBuilder, SchemaDatabase};

/// A [`SchemaProvider`] that loads its database on first lookup.
///
/// The configured fallback chain runs at most once; a failed load is
/// remembered and reported on every later lookup.
///
/// # Examples
///
/// ```
/// use resource_command_core::SchemaProvider;
/// use resource_command_db::{LazySchemaDatabase, SchemaDatabase};
///
/// let lazy = LazySchemaDatabase::new(
///     SchemaDatabase::builder()
///         .with_embedded(r#"{"version": "1.0.0", "resources": [{"name": "hosts"}]}"#),
/// );
/// assert!(!lazy.is_loaded());
/// assert!(lazy.schema("hosts").is_ok());
/// assert!(lazy.is_loaded());
/// ```
#[derive(Debug)]
pub struct LazySchemaDatabase {
    builder: DatabaseBuilder,
    database: OnceLock<Result<SchemaDatabase, String>>,
}

impl LazySchemaDatabase {
    /// Wraps a builder whose chain runs on first use.
    pub fn new(builder: DatabaseBuilder) -> Self {
        Self {
            builder,
            database: OnceLock::new(),
        }
    }

    /// Returns `true` once a load has been attempted.
    pub fn is_loaded(&self) -> bool {
        self.database.get().is_some()
    }

    /// Returns the database, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unavailable`] if every source failed.
    pub fn database(&self) -> Result<&SchemaDatabase, SchemaError> {
        self.database
            .get_or_init(|| {
                info!("Loading schema database");
                self.builder.build().map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(|e| SchemaError::Unavailable(e.clone()))
    }
}

impl SchemaProvider for LazySchemaDatabase {
    fn schema(&self, resource: &str) -> Result<&ResourceSchema, SchemaError> {
        self.database()?.schema(resource)
    }
}
