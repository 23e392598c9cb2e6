//! Option composition and conditional validation for resource commands.
//!
//! This crate turns a declarative command definition into a working CLI
//! command against a REST resource:
//!
//! - [`ResourceSchema`]: what a resource exposes (scalar fields,
//!   associations, actions).
//! - [`CompositionDirective`]: which fields to drop, how associations expand,
//!   and which options to add or remove.
//! - [`derive`]: computes the final, ordered [`ResolvedOptionSet`].
//! - [`ValidationRule`] / [`validate`]: cross-option rules evaluated against
//!   [`SuppliedValues`], reporting every [`Violation`] at once.
//! - [`ResponsePostProcessor`]: default injection and deduplication of
//!   returned records.
//! - [`CommandSpec`]: bundles all of the above; [`CommandSpec::prepare`]
//!   resolves it against a schema and [`PreparedCommand::run`] executes it
//!   through a [`Transport`].
//!
//! Structural checks on schemas live in [`validate_schema`] and
//! [`validate_package`].
//!
//! # Example
//!
//! ```
//! use resource_command_core::*;
//! use serde_json::json;
//!
//! let schema = ResourceSchema::new("smart_class_parameters")
//!     .with_field(FieldSchema::new("override", ValueKind::Bool))
//!     .with_field(FieldSchema::new("override_value_order", ValueKind::List))
//!     .with_association(AssociationSchema::new("puppetclasses", "puppetclass"))
//!     .with_action(
//!         ActionSchema::new("update", Method::Put)
//!             .with_wrapper("smart_class_parameter")
//!             .with_param(ActionParam::plain("id"))
//!             .with_param(ActionParam::wrapped("override"))
//!             .with_param(ActionParam::wrapped("override_value_order")),
//!     );
//!
//! let command = CommandSpec::new("update", "smart_class_parameters", "update")
//!     .with_rule(ValidationRule::required("id"));
//! let prepared = command.prepare(&schema).unwrap();
//!
//! let invocation = prepared.parse([("id", "7"), ("override_value_order", "fqdn,os")]);
//! assert!(invocation.violations.is_empty());
//!
//! let request = prepared.build_request(&invocation.values);
//! assert_eq!(
//!     request.params["smart_class_parameter"]["override_value_order"],
//!     json!("fqdn\nos")
//! );
//! ```

mod command;
mod derive;
mod directive;
mod error;
mod package;
mod postprocess;
mod provider;
mod request;
mod rules;
mod transport;
mod types;
mod validate;
mod values;

pub use command::{CommandAlias, CommandOutcome, CommandSpec, Invocation, PreparedCommand};
pub use derive::{ResolvedOptionSet, derive};
pub use directive::{CompositionDirective, DirectiveBuilder, ExpandDirective, ExpandMode};
pub use error::{
    CommandError, CompositionError, DeriveError, ProcessingError, Result, SchemaError,
};
pub use package::SchemaPackage;
pub use postprocess::{
    CollectionMeta, FieldDefault, Record, RecordCollection, Response, ResponsePostProcessor,
    deduplicate,
};
pub use provider::SchemaProvider;
pub use request::{Request, build_request, join_list};
pub use rules::{Cardinality, ValidationRule, Violation, validate};
pub use transport::{FieldError, Transport, TransportError};
pub use types::*;
pub use validate::{ValidationError, validate_options, validate_package, validate_schema};
pub use values::{SuppliedValue, SuppliedValues, ValueSource, normalize};
