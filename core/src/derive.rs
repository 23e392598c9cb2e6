//! Option derivation from a resource schema and a composition directive.
//!
//! [`derive`] is a pure function: the same schema and directive always
//! produce the same, identically ordered, option set. Options appear as
//! remaining scalars, then association options in schema order, then the
//! directive's added options in declaration order.
//!
//! # Example
//!
//! ```
//! use resource_command_core::*;
//!
//! let schema = ResourceSchema::new("smart_class_parameters")
//!     .with_field(FieldSchema::new("search", ValueKind::String))
//!     .with_field(FieldSchema::new("host_id", ValueKind::String))
//!     .with_association(AssociationSchema::new("hosts", "host"))
//!     .with_association(AssociationSchema::new("puppetclasses", "puppetclass"));
//!
//! let directive = CompositionDirective::builder()
//!     .expand(|e| e.except(["hosts"]))
//!     .build()
//!     .unwrap();
//!
//! let options = derive(&schema, &directive).unwrap();
//! assert_eq!(
//!     options.names(),
//!     vec!["search", "puppetclass_id", "puppetclass_name"]
//! );
//! ```

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::directive::CompositionDirective;
use crate::error::DeriveError;
use crate::types::{OptionSpec, ResourceSchema, ValueKind};

/// Ordered set of options a command accepts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolvedOptionSet {
    options: Vec<OptionSpec>,
}

impl ResolvedOptionSet {
    /// Wraps an already ordered option list.
    pub fn from_options(options: Vec<OptionSpec>) -> Self {
        Self { options }
    }

    /// Finds an option by name.
    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Finds an option by its long flag.
    pub fn find_flag(&self, flag: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.cli_flag == flag)
    }

    /// Returns `true` if an option with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Option names in order.
    pub fn names(&self) -> Vec<&str> {
        self.options.iter().map(|o| o.name.as_str()).collect()
    }

    /// Iterates over the options in order.
    pub fn iter(&self) -> impl Iterator<Item = &OptionSpec> {
        self.options.iter()
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if there are no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Renders the long flag of an option, falling back to the derived form.
    pub fn flag_for(&self, name: &str) -> String {
        self.get(name)
            .map(|o| o.cli_flag.clone())
            .unwrap_or_else(|| crate::types::option_flag(name))
    }
}

impl<'a> IntoIterator for &'a ResolvedOptionSet {
    type Item = &'a OptionSpec;
    type IntoIter = std::slice::Iter<'a, OptionSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

/// Derives the options of a command.
///
/// # Errors
///
/// Returns [`DeriveError::UnknownAssociation`] if the directive's expansion
/// settings name an association the schema does not declare.
pub fn derive(
    schema: &ResourceSchema,
    directive: &CompositionDirective,
) -> Result<ResolvedOptionSet, DeriveError> {
    for association in directive.expand.referenced() {
        if schema.find_association(association).is_none() {
            return Err(DeriveError::UnknownAssociation {
                resource: schema.name.clone(),
                association: association.to_string(),
            });
        }
    }

    // Foreign keys of omitted associations go too, even when the action
    // lists them as plain parameters.
    let omitted_keys: HashSet<String> = schema
        .associations
        .iter()
        .filter(|a| directive.expand.omits(&a.name))
        .map(|a| a.foreign_key())
        .collect();

    let mut options: Vec<OptionSpec> = schema
        .scalar_fields
        .iter()
        .filter(|f| !directive.excludes_scalar(&f.name) && !omitted_keys.contains(&f.name))
        .map(OptionSpec::from_field)
        .collect();

    for association in &schema.associations {
        if directive.expand.omits(&association.name) {
            continue;
        }

        let foreign_key = association.foreign_key();
        if !options.iter().any(|o| o.name == foreign_key) {
            options.push(
                OptionSpec::new(&foreign_key, ValueKind::String)
                    .with_description(&format!("Id of the {}", association.singular)),
            );
        }

        if directive.expand.expands(&association.name) {
            for (searchable, name) in association
                .searchables
                .iter()
                .zip(association.expanded_fields())
            {
                if options.iter().any(|o| o.name == name) {
                    continue;
                }
                options.push(OptionSpec::new(&name, ValueKind::String).with_description(
                    &format!("{} of the {}", capitalize(searchable), association.singular),
                ));
            }
        }
    }

    options.retain(|o| !directive.removed_options.contains(&o.name));

    for extra in &directive.extra_options {
        options.retain(|o| o.name != extra.name);
        options.push(extra.clone());
    }

    debug!(
        resource = %schema.name,
        options = options.len(),
        "Derived command options"
    );

    Ok(ResolvedOptionSet { options })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
