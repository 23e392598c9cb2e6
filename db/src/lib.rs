//! Schema loading and CLI configuration for resource commands.
//!
//! This crate loads [`ResourceSchema`](resource_command_core::ResourceSchema)
//! definitions from various sources (directories, bundles, embedded data)
//! and serves them through the
//! [`SchemaProvider`](resource_command_core::SchemaProvider) seam.
//!
//! # Quick start
//!
//! ```no_run
//! use resource_command_core::SchemaProvider;
//! use resource_command_db::{CliConfig, LazySchemaDatabase, SchemaDatabase};
//!
//! // Load schemas from a directory
//! let db = SchemaDatabase::from_dir("schemas/").unwrap();
//! let schema = db.schema("smart_class_parameters").unwrap();
//! println!("{} associations", schema.associations.len());
//!
//! // Defer loading until the first lookup
//! let lazy = LazySchemaDatabase::new(
//!     SchemaDatabase::builder()
//!         .from_dir("schemas/")
//!         .from_bundle("foreman.json"),
//! );
//!
//! // Read CLI settings
//! let config = CliConfig::load("sc-param.yml").unwrap();
//! ```

mod config;
mod error;
mod lazy;
mod loader;

pub use config::{CliConfig, OutputFormat};
pub use error::{DatabaseError, Result};
pub use lazy::LazySchemaDatabase;
pub use loader::{DatabaseBuilder, DatabaseSource, SchemaDatabase};
