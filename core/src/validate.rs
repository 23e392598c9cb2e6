//! Schema and package validation.
//!
//! Validates structural invariants of resource schemas and schema packages,
//! catching errors such as duplicate fields, actions referring to undeclared
//! wrappers, and option flags that collide before they cause downstream
//! issues.
//!
//! # Examples
//!
//! ```
//! use resource_command_core::*;
//!
//! let schema = ResourceSchema::new("override_values")
//!     .with_field(FieldSchema::new("match", ValueKind::String));
//! assert!(validate_schema(&schema).is_empty());
//!
//! // Invalid: the same field twice
//! let bad = ResourceSchema::new("override_values")
//!     .with_field(FieldSchema::new("match", ValueKind::String))
//!     .with_field(FieldSchema::new("match", ValueKind::Bool));
//! assert!(!validate_schema(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{ActionSchema, ResolvedOptionSet, ResourceSchema, SchemaPackage, ValueKind};

/// Schema/package validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Package version string is empty.
    #[error("package version cannot be empty")]
    EmptyPackageVersion,
    /// Resource name is empty or whitespace-only.
    #[error("resource name cannot be empty")]
    EmptyResourceName,
    /// Two schemas in the same package share a resource name.
    #[error("duplicate resource in package: {0}")]
    DuplicateResource(String),
    /// Two scalar fields share a name.
    #[error("duplicate field in {resource}: {field}")]
    DuplicateField { resource: String, field: String },
    /// Two associations share a name.
    #[error("duplicate association in {resource}: {association}")]
    DuplicateAssociation {
        resource: String,
        association: String,
    },
    /// An association declares no singular name.
    #[error("association {0} has no singular name")]
    MissingSingular(String),
    /// Two actions share a name.
    #[error("duplicate action in {resource}: {action}")]
    DuplicateAction { resource: String, action: String },
    /// An action marks parameters as wrapped without naming a wrapper.
    #[error("action {resource}#{action} wraps parameters but has no wrapper")]
    MissingWrapper { resource: String, action: String },
    /// An enum field lists no values.
    #[error("enum field {0} has no values")]
    EmptyEnum(String),
    /// An option flag is not a valid long flag.
    #[error("invalid long flag format: {0}")]
    InvalidLongFlag(String),
    /// Two options resolve to the same flag.
    #[error("duplicate flag in option set: {0}")]
    DuplicateFlag(String),
}

/// Validates a full schema package.
///
/// Checks for an empty version string, duplicate resource names, and
/// validates each schema individually.
///
/// # Examples
///
/// ```
/// use resource_command_core::*;
///
/// let mut package = SchemaPackage::new("1.0.0");
/// package.resources.push(ResourceSchema::new("hosts"));
/// assert!(validate_package(&package).is_empty());
///
/// // Duplicate resource → error
/// package.resources.push(ResourceSchema::new("hosts"));
/// let errors = validate_package(&package);
/// assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateResource(_))));
/// ```
pub fn validate_package(package: &SchemaPackage) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if package.version.trim().is_empty() {
        errors.push(ValidationError::EmptyPackageVersion);
        return errors;
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for schema in &package.resources {
        let name = schema.name.as_str();
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateResource(name.to_string()));
            return errors;
        }
        errors.extend(validate_schema(schema));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

/// Validates a resource schema.
///
/// Stops at the first problem found.
pub fn validate_schema(schema: &ResourceSchema) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let resource = schema.name.trim();

    if resource.is_empty() {
        errors.push(ValidationError::EmptyResourceName);
        return errors;
    }

    let mut fields = HashSet::new();
    for field in &schema.scalar_fields {
        if !fields.insert(field.name.as_str()) {
            errors.push(ValidationError::DuplicateField {
                resource: resource.to_string(),
                field: field.name.clone(),
            });
            return errors;
        }
        if matches!(&field.kind, ValueKind::Enum(values) if values.is_empty()) {
            errors.push(ValidationError::EmptyEnum(field.name.clone()));
            return errors;
        }
    }

    let mut associations = HashSet::new();
    for association in &schema.associations {
        if !associations.insert(association.name.as_str()) {
            errors.push(ValidationError::DuplicateAssociation {
                resource: resource.to_string(),
                association: association.name.clone(),
            });
            return errors;
        }
        if association.singular.trim().is_empty() {
            errors.push(ValidationError::MissingSingular(association.name.clone()));
            return errors;
        }
    }

    errors.extend(validate_actions(resource, &schema.actions));
    errors
}

fn validate_actions(resource: &str, actions: &[ActionSchema]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for action in actions {
        if !seen.insert(action.name.as_str()) {
            errors.push(ValidationError::DuplicateAction {
                resource: resource.to_string(),
                action: action.name.clone(),
            });
            return errors;
        }
        if action.wrapper.is_none() && action.params.iter().any(|p| p.wrapped) {
            errors.push(ValidationError::MissingWrapper {
                resource: resource.to_string(),
                action: action.name.clone(),
            });
            return errors;
        }
    }

    errors
}

/// Validates the flags of a derived option set.
///
/// Extra options can carry hand-written flags, so two options may end up
/// with the same flag or with one that is not a long flag.
pub fn validate_options(options: &ResolvedOptionSet) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for option in options {
        let flag = &option.cli_flag;
        if !flag.starts_with("--") || flag.len() < 3 {
            errors.push(ValidationError::InvalidLongFlag(flag.clone()));
            return errors;
        }
        if !seen.insert(flag.as_str()) {
            errors.push(ValidationError::DuplicateFlag(flag.clone()));
            return errors;
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::{ActionParam, AssociationSchema, FieldSchema, Method, OptionSpec};

    use super::*;

    #[test]
    fn test_validate_package_rejects_duplicate_resources() {
        let mut package = SchemaPackage::new("1.0.0");
        package.resources.push(ResourceSchema::new("hosts"));
        package.resources.push(ResourceSchema::new("hosts"));

        let errors = validate_package(&package);
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateResource("hosts".to_string())]
        );
    }

    #[test]
    fn test_validate_package_rejects_empty_version() {
        let package = SchemaPackage::new(" ");
        assert_eq!(
            validate_package(&package),
            vec![ValidationError::EmptyPackageVersion]
        );
    }

    #[test]
    fn test_validate_schema_rejects_duplicate_association() {
        let schema = ResourceSchema::new("smart_class_parameters")
            .with_association(AssociationSchema::new("hosts", "host"))
            .with_association(AssociationSchema::new("hosts", "host"));

        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::DuplicateAssociation {
                resource: "smart_class_parameters".to_string(),
                association: "hosts".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_schema_rejects_wrapped_params_without_wrapper() {
        let schema = ResourceSchema::new("smart_class_parameters").with_action(
            ActionSchema::new("update", Method::Put).with_param(ActionParam::wrapped("override")),
        );

        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::MissingWrapper {
                resource: "smart_class_parameters".to_string(),
                action: "update".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_schema_rejects_empty_enum() {
        let schema = ResourceSchema::new("smart_class_parameters")
            .with_field(FieldSchema::new("parameter_type", ValueKind::Enum(vec![])));

        assert_eq!(
            validate_schema(&schema),
            vec![ValidationError::EmptyEnum("parameter_type".to_string())]
        );
    }

    #[test]
    fn test_validate_options_rejects_colliding_flags() {
        let options = ResolvedOptionSet::from_options(vec![
            OptionSpec::new("puppetclass_name", ValueKind::String),
            OptionSpec::new("puppet_class", ValueKind::String).with_flag("--puppetclass-name"),
        ]);

        assert_eq!(
            validate_options(&options),
            vec![ValidationError::DuplicateFlag("--puppetclass-name".to_string())]
        );
    }

    #[test]
    fn test_validate_schema_accepts_valid_schema() {
        let schema = ResourceSchema::new("override_values")
            .with_field(FieldSchema::new("match", ValueKind::String))
            .with_association(AssociationSchema::new("puppetclasses", "puppetclass"))
            .with_action(
                ActionSchema::new("create", Method::Post)
                    .with_wrapper("override_value")
                    .with_param(ActionParam::wrapped("match")),
            );

        assert!(validate_schema(&schema).is_empty());
    }
}
