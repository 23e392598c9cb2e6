//! Smart class parameter commands.
//!
//! Every command here is a declaration: a directive, rules, response
//! handling and messages. The option surface comes from the resource
//! schema at run time.

use resource_command_core::{
    CommandAlias, CommandSpec, CompositionDirective, CompositionError, OptionSpec,
    ResponsePostProcessor, ValidationRule, ValueKind,
};
use serde_json::json;

const RESOURCE: &str = "smart_class_parameters";
const OVERRIDE_VALUES: &str = "override_values";

/// Associations a smart class parameter can be listed under, with the
/// command group that exposes the brief list.
pub const PARENTS: [(&str, &str); 4] = [
    ("host", "hosts"),
    ("hostgroup", "hostgroups"),
    ("puppet-class", "puppetclasses"),
    ("environment", "environments"),
];

const PARENT_KEYS: [&str; 4] = ["host_id", "puppetclass_id", "environment_id", "hostgroup_id"];

const PARAMETER_TYPES: [&str; 8] = [
    "string", "boolean", "integer", "real", "array", "hash", "yaml", "json",
];

/// Named set of commands exposed as one subcommand of the binary.
#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub name: &'static str,
    pub about: String,
    pub commands: Vec<CommandSpec>,
}

/// All command groups of the binary.
pub fn groups() -> Result<Vec<CommandGroup>, CompositionError> {
    let mut groups = vec![CommandGroup {
        name: "smart-class-parameter",
        about: "Manipulate smart class parameters".to_string(),
        commands: vec![
            list()?,
            info()?,
            update()?,
            add_matcher()?,
            remove_matcher()?,
        ],
    }];

    for (group, association) in PARENTS {
        groups.push(CommandGroup {
            name: group,
            about: format!("Smart class parameters of {association}"),
            commands: vec![brief_list(association)?],
        });
    }

    Ok(groups)
}

/// Brief parameter list scoped to one parent association.
///
/// The API returns a row once per joined dimension when filtered, so the
/// collection is deduplicated.
pub fn brief_list(parent: &str) -> Result<CommandSpec, CompositionError> {
    let others: Vec<&str> = PARENTS
        .iter()
        .map(|(_, association)| *association)
        .filter(|association| *association != parent)
        .collect();

    let directive = CompositionDirective::builder()
        .without(PARENT_KEYS)
        .expand(|e| e.except(others))
        .build()?;

    Ok(CommandSpec::new("sc-params", RESOURCE, "index")
        .with_description("List all smart class parameters")
        .with_directive(directive)
        .with_post_processor(ResponsePostProcessor::new().deduplicated()))
}

pub fn list() -> Result<CommandSpec, CompositionError> {
    Ok(CommandSpec::new("list", RESOURCE, "index")
        .with_description("List smart class parameters")
        .with_directive(CompositionDirective::builder().build()?)
        .with_post_processor(
            ResponsePostProcessor::new().with_default("parameter_type", json!("string")),
        ))
}

pub fn info() -> Result<CommandSpec, CompositionError> {
    let directive = CompositionDirective::builder()
        .expand(|e| e.including(["puppetclasses"]))
        .build()?;

    Ok(CommandSpec::new("info", RESOURCE, "show")
        .with_description("Show a smart class parameter")
        .with_directive(directive)
        .with_rule(puppetclass_required_with("name"))
        .with_post_processor(
            ResponsePostProcessor::new()
                .with_default("parameter_type", json!("string"))
                .with_default("use_puppet_default", json!(false)),
        ))
}

pub fn update() -> Result<CommandSpec, CompositionError> {
    let directive = CompositionDirective::builder()
        .option(
            OptionSpec::new("default_value", ValueKind::String)
                .with_description("Value to use when there is no match"),
        )
        .expand(|e| e.including(["puppetclasses"]))
        .without([
            "parameter_type",
            "validator_type",
            "override",
            "required",
            "override_value_order",
        ])
        .option(
            OptionSpec::new("override", ValueKind::Bool)
                .with_description("Override this parameter"),
        )
        .option(
            OptionSpec::new("required", ValueKind::Bool)
                .with_description("This parameter is required"),
        )
        .option(
            OptionSpec::new("parameter_type", enum_of(&PARAMETER_TYPES))
                .with_description("Type of the parameter"),
        )
        .option(
            OptionSpec::new("validator_type", enum_of(&["regexp", "list", ""]))
                .with_description("Type of the validator"),
        )
        .option(
            OptionSpec::new("override_value_order", ValueKind::List)
                .with_description("The order in which values are resolved"),
        )
        .build()?;

    Ok(CommandSpec::new("update", RESOURCE, "update")
        .with_description("Update a smart class parameter")
        .with_directive(directive)
        .with_rule(puppetclass_required_with("name"))
        .with_success_message("Parameter updated.")
        .with_failure_message("Could not update the parameter"))
}

pub fn add_matcher() -> Result<CommandSpec, CompositionError> {
    let directive = matcher_directive()
        .option(
            OptionSpec::new("value", ValueKind::String)
                .with_description("Override value, required if omit is false"),
        )
        .build()?;

    Ok(CommandSpec::new("add-matcher", OVERRIDE_VALUES, "create")
        .with_description("Create an override value for a specific smart class parameter")
        .with_directive(directive)
        .with_rule(
            ValidationRule::rejected_when("value", "use_puppet_default", json!(true))
                .with_message("Cannot use {subject} when {condition} is true."),
        )
        .with_rule(puppetclass_required_with("smart_class_parameter_name"))
        .with_success_message("Override value created.")
        .with_failure_message("Could not create the override value")
        .with_alias(CommandAlias::deprecated(
            "add-override-value",
            "Create an override value for a specific smart variable",
            "add-override-value command is deprecated and will be removed in one of the \
             future versions. Please use add-matcher command instead.",
        )))
}

pub fn remove_matcher() -> Result<CommandSpec, CompositionError> {
    Ok(CommandSpec::new("remove-matcher", OVERRIDE_VALUES, "destroy")
        .with_description("Delete an override value for a specific smart class parameter")
        .with_directive(matcher_directive().build()?)
        .with_rule(puppetclass_required_with("smart_class_parameter_name"))
        .with_success_message("Override value deleted.")
        .with_failure_message("Could not delete the override value")
        .with_alias(CommandAlias::deprecated(
            "remove-override-value",
            "Remove an override value for a specific smart variable",
            "remove-override-value command is deprecated and will be removed in one of the \
             future versions. Please use remove-matcher command instead.",
        )))
}

fn matcher_directive() -> resource_command_core::DirectiveBuilder {
    CompositionDirective::builder()
        .without(["smart_variable_id"])
        .expand(|e| e.except(["smart_variables"]).including(["puppetclasses"]))
}

/// A parameter name is ambiguous without its puppet class.
fn puppetclass_required_with(trigger: &str) -> ValidationRule {
    ValidationRule::any_required(trigger, &["puppetclass_name", "puppetclass_id"])
}

fn enum_of(values: &[&str]) -> ValueKind {
    ValueKind::Enum(values.iter().map(|v| v.to_string()).collect())
}
