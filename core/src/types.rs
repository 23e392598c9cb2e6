//! Schema type definitions for resource and option modeling.
//!
//! This module defines the data model the derivation engine works on: a
//! [`ResourceSchema`] describes what a remote resource exposes (scalar
//! fields, associations to other resources, actions), and an
//! [`OptionSpec`] describes one concrete CLI option derived from it. The
//! schema types are designed for serialization with [`serde`] so they can be
//! loaded from JSON or YAML schema files.

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Version of the schema contract (semver).
///
/// Embedded in every [`SchemaPackage`](crate::SchemaPackage) to track
/// compatibility across schema versions.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// Value kind for fields and options.
///
/// Determines how a raw command-line string is normalized and how the value
/// is transmitted.
///
/// # Examples
///
/// ```
/// use resource_command_core::ValueKind;
///
/// assert_eq!(ValueKind::default(), ValueKind::String);
///
/// let kind = ValueKind::Enum(vec!["regexp".into(), "list".into()]);
/// assert!(kind.takes_value());
/// assert!(!ValueKind::Flag.takes_value());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free-form string (the default).
    #[default]
    String,
    /// Integer value.
    Number,
    /// Boolean value given explicitly (`--override true`).
    Bool,
    /// One of a closed set of values.
    Enum(Vec<String>),
    /// Ordered list of strings, comma-separated on the command line.
    List,
    /// Presence-only switch without a value.
    Flag,
}

impl ValueKind {
    /// Returns `true` if options of this kind take a value argument.
    pub fn takes_value(&self) -> bool {
        !matches!(self, ValueKind::Flag)
    }

    /// Short name used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::Enum(_) => "enum",
            ValueKind::List => "list",
            ValueKind::Flag => "flag",
        }
    }
}

/// A scalar field declared by a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name as the API knows it (e.g. `default_value`)
    pub name: String,
    /// Value kind of the field
    #[serde(default)]
    pub kind: ValueKind,
    /// Description from the API documentation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the API marks the field as required
    #[serde(default)]
    pub required: bool,
}

impl FieldSchema {
    /// Creates a field of the given kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use resource_command_core::{FieldSchema, ValueKind};
    ///
    /// let field = FieldSchema::new("override", ValueKind::Bool)
    ///     .with_description("Override this parameter");
    /// assert_eq!(field.name, "override");
    /// assert!(!field.required);
    /// ```
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: None,
            required: false,
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Marks the field as required by the API.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

fn default_searchables() -> Vec<String> {
    vec!["name".to_string()]
}

/// A relation from the resource to another resource.
///
/// An association contributes a foreign-key option (`<singular>_id`) and,
/// when expanded, one option per searchable field of the target
/// (`<singular>_name`, ...).
///
/// # Examples
///
/// ```
/// use resource_command_core::AssociationSchema;
///
/// let assoc = AssociationSchema::new("puppetclasses", "puppetclass");
/// assert_eq!(assoc.foreign_key(), "puppetclass_id");
/// assert_eq!(assoc.expanded_fields(), vec!["puppetclass_name"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationSchema {
    /// Plural association name (e.g. `puppetclasses`)
    pub name: String,
    /// Singular form used to build option names (e.g. `puppetclass`)
    pub singular: String,
    /// Target resource, when it differs from the association name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Fields of the target usable in place of its id
    #[serde(default = "default_searchables")]
    pub searchables: Vec<String>,
}

impl AssociationSchema {
    /// Creates an association searchable by `name`.
    pub fn new(name: &str, singular: &str) -> Self {
        Self {
            name: name.to_string(),
            singular: singular.to_string(),
            resource: None,
            searchables: default_searchables(),
        }
    }

    /// Replaces the searchable fields.
    pub fn with_searchables(mut self, searchables: &[&str]) -> Self {
        self.searchables = searchables.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Name of the foreign-key field.
    pub fn foreign_key(&self) -> String {
        format!("{}_id", self.singular)
    }

    /// Names of the options produced when the association is expanded.
    pub fn expanded_fields(&self) -> Vec<String> {
        self.searchables
            .iter()
            .map(|s| format!("{}_{}", self.singular, s))
            .collect()
    }

    /// Target resource name.
    pub fn target(&self) -> &str {
        self.resource.as_deref().unwrap_or(&self.name)
    }
}

/// HTTP method of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

/// One parameter accepted by an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParam {
    /// Parameter name
    pub name: String,
    /// Whether the parameter is nested under the action's wrapper key
    #[serde(default)]
    pub wrapped: bool,
}

impl ActionParam {
    /// Creates a top-level parameter.
    pub fn plain(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wrapped: false,
        }
    }

    /// Creates a parameter nested under the wrapper key.
    pub fn wrapped(name: &str) -> Self {
        Self {
            name: name.to_string(),
            wrapped: true,
        }
    }
}

/// An API action of a resource (e.g. `index`, `update`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSchema {
    /// Action name
    pub name: String,
    /// HTTP method
    #[serde(default)]
    pub method: Method,
    /// Request path template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Accepted parameters in documentation order
    #[serde(default)]
    pub params: Vec<ActionParam>,
    /// Key wrapped parameters are nested under (e.g. `smart_class_parameter`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<String>,
}

impl ActionSchema {
    /// Creates an action with no parameters.
    pub fn new(name: &str, method: Method) -> Self {
        Self {
            name: name.to_string(),
            method,
            path: None,
            params: Vec::new(),
            wrapper: None,
        }
    }

    /// Adds a parameter.
    pub fn with_param(mut self, param: ActionParam) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the wrapper key.
    pub fn with_wrapper(mut self, wrapper: &str) -> Self {
        self.wrapper = Some(wrapper.to_string());
        self
    }

    /// Finds a parameter by name.
    pub fn find_param(&self, name: &str) -> Option<&ActionParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Complete schema for a remote resource.
///
/// # Examples
///
/// ```
/// use resource_command_core::*;
///
/// let schema = ResourceSchema::new("smart_class_parameters")
///     .with_field(FieldSchema::new("id", ValueKind::String))
///     .with_field(FieldSchema::new("default_value", ValueKind::String))
///     .with_association(AssociationSchema::new("puppetclasses", "puppetclass"))
///     .with_action(
///         ActionSchema::new("show", Method::Get).with_param(ActionParam::plain("id")),
///     );
///
/// let show = schema.for_action("show").unwrap();
/// assert_eq!(show.scalar_fields.len(), 1);
/// assert_eq!(show.association_names(), vec!["puppetclasses"]);
/// assert!(schema.for_action("destroy").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Resource name (e.g. `smart_class_parameters`)
    pub name: String,
    /// Short description of the resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scalar fields
    #[serde(default)]
    pub scalar_fields: Vec<FieldSchema>,
    /// Associations in declaration order
    #[serde(default)]
    pub associations: Vec<AssociationSchema>,
    /// Actions
    #[serde(default)]
    pub actions: Vec<ActionSchema>,
}

impl ResourceSchema {
    /// Creates an empty schema for the named resource.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a scalar field.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.scalar_fields.push(field);
        self
    }

    /// Adds an association.
    pub fn with_association(mut self, association: AssociationSchema) -> Self {
        self.associations.push(association);
        self
    }

    /// Adds an action.
    pub fn with_action(mut self, action: ActionSchema) -> Self {
        self.actions.push(action);
        self
    }

    /// Finds a scalar field by name.
    pub fn find_field(&self, name: &str) -> Option<&FieldSchema> {
        self.scalar_fields.iter().find(|f| f.name == name)
    }

    /// Finds an association by its plural name.
    pub fn find_association(&self, name: &str) -> Option<&AssociationSchema> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Finds an action by name.
    pub fn find_action(&self, name: &str) -> Option<&ActionSchema> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Gets all association names in declaration order.
    pub fn association_names(&self) -> Vec<&str> {
        self.associations.iter().map(|a| a.name.as_str()).collect()
    }

    /// Projects the schema onto one action.
    ///
    /// The scalar fields of the result are the action's parameters, in the
    /// action's order; parameters the resource does not declare as fields
    /// are kept as plain string fields. Associations are carried over
    /// unchanged and only the requested action remains.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownAction`] if the resource has no such
    /// action.
    pub fn for_action(&self, action: &str) -> Result<ResourceSchema, SchemaError> {
        let Some(found) = self.find_action(action) else {
            return Err(SchemaError::UnknownAction {
                resource: self.name.clone(),
                action: action.to_string(),
            });
        };

        let scalar_fields = found
            .params
            .iter()
            .map(|param| {
                self.find_field(&param.name)
                    .cloned()
                    .unwrap_or_else(|| FieldSchema::new(&param.name, ValueKind::String))
            })
            .collect();

        Ok(ResourceSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            scalar_fields,
            associations: self.associations.clone(),
            actions: vec![found.clone()],
        })
    }
}

/// Builds the long flag for an option name (`use_puppet_default` →
/// `--use-puppet-default`).
pub fn option_flag(name: &str) -> String {
    format!("--{}", name.replace('_', "-"))
}

/// A concrete command-line option.
///
/// # Examples
///
/// ```
/// use resource_command_core::{OptionSpec, ValueKind};
///
/// let opt = OptionSpec::new("override_value_order", ValueKind::List)
///     .with_description("The order in which values are resolved");
/// assert_eq!(opt.cli_flag, "--override-value-order");
/// assert_eq!(opt.param_name(), "override_value_order");
///
/// let opt = OptionSpec::new("value", ValueKind::String).with_param("override_value");
/// assert_eq!(opt.param_name(), "override_value");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    /// Option name (snake case, unique within a command)
    pub name: String,
    /// Long flag (e.g. `--default-value`)
    pub cli_flag: String,
    /// Help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Value kind
    pub kind: ValueKind,
    /// Value used when the option is not supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Request parameter the option feeds, when different from `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl OptionSpec {
    /// Creates an option whose flag is derived from its name.
    pub fn new(name: &str, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            cli_flag: option_flag(name),
            description: None,
            kind,
            default: None,
            param: None,
        }
    }

    /// Creates the option derived from a scalar field.
    pub fn from_field(field: &FieldSchema) -> Self {
        Self {
            description: field.description.clone(),
            ..Self::new(&field.name, field.kind.clone())
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Overrides the derived long flag.
    pub fn with_flag(mut self, flag: &str) -> Self {
        self.cli_flag = flag.to_string();
        self
    }

    /// Routes the option to a differently named request parameter.
    pub fn with_param(mut self, param: &str) -> Self {
        self.param = Some(param.to_string());
        self
    }

    /// Request parameter name.
    pub fn param_name(&self) -> &str {
        self.param.as_deref().unwrap_or(&self.name)
    }
}
