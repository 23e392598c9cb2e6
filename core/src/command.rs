//! Generic resource commands built by composition.
//!
//! A [`CommandSpec`] bundles a composition directive, validation rules, a
//! response post-processor and metadata. It is defined once; each
//! invocation prepares it against the resource schema and runs the
//! resulting [`PreparedCommand`].

use serde_json::Value;
use tracing::{debug, info};

use crate::derive::{ResolvedOptionSet, derive};
use crate::directive::CompositionDirective;
use crate::error::{CommandError, Result};
use crate::postprocess::{Response, ResponsePostProcessor};
use crate::provider::SchemaProvider;
use crate::request::{Request, build_request};
use crate::rules::{ValidationRule, Violation, validate};
use crate::transport::Transport;
use crate::types::{ActionSchema, ResourceSchema};
use crate::validate::validate_options;
use crate::values::SuppliedValues;

/// An alternative name for a command, usually a deprecated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAlias {
    pub name: String,
    pub description: Option<String>,
    pub hidden: bool,
    /// Printed before the command runs under this name
    pub warning: Option<String>,
}

impl CommandAlias {
    /// A hidden alias that warns on use.
    pub fn deprecated(name: &str, description: &str, warning: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Some(description.to_string()),
            hidden: true,
            warning: Some(warning.to_string()),
        }
    }
}

/// Declarative definition of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub name: String,
    pub resource: String,
    pub action: String,
    pub description: Option<String>,
    pub directive: CompositionDirective,
    pub rules: Vec<ValidationRule>,
    pub post_processor: ResponsePostProcessor,
    pub success_message: Option<String>,
    pub failure_message: Option<String>,
    pub hidden: bool,
    pub aliases: Vec<CommandAlias>,
}

impl CommandSpec {
    /// Creates a command for a resource action with an empty directive.
    pub fn new(name: &str, resource: &str, action: &str) -> Self {
        Self {
            name: name.to_string(),
            resource: resource.to_string(),
            action: action.to_string(),
            description: None,
            directive: CompositionDirective::default(),
            rules: Vec::new(),
            post_processor: ResponsePostProcessor::default(),
            success_message: None,
            failure_message: None,
            hidden: false,
            aliases: Vec::new(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets the composition directive.
    pub fn with_directive(mut self, directive: CompositionDirective) -> Self {
        self.directive = directive;
        self
    }

    /// Adds a validation rule.
    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Sets the response post-processor.
    pub fn with_post_processor(mut self, post: ResponsePostProcessor) -> Self {
        self.post_processor = post;
        self
    }

    /// Sets the message shown on success.
    pub fn with_success_message(mut self, message: &str) -> Self {
        self.success_message = Some(message.to_string());
        self
    }

    /// Sets the message prefixed to request failures.
    pub fn with_failure_message(mut self, message: &str) -> Self {
        self.failure_message = Some(message.to_string());
        self
    }

    /// Adds an alias.
    pub fn with_alias(mut self, alias: CommandAlias) -> Self {
        self.aliases.push(alias);
        self
    }

    /// Finds an alias by name.
    pub fn find_alias(&self, name: &str) -> Option<&CommandAlias> {
        self.aliases.iter().find(|a| a.name == name)
    }

    /// Resolves the command against its resource schema.
    ///
    /// # Errors
    ///
    /// Fails when the action is unknown, when the directive names an
    /// association the schema lacks, when two options share a flag, or when
    /// a rule references an option the derived set does not contain.
    pub fn prepare(&self, schema: &ResourceSchema) -> Result<PreparedCommand<'_>> {
        let view = schema.for_action(&self.action)?;
        let options = derive(&view, &self.directive)?;

        if let Some(source) = validate_options(&options).into_iter().next() {
            return Err(CommandError::InvalidOption {
                command: self.name.clone(),
                source,
            });
        }

        for rule in &self.rules {
            for option in rule.referenced_options() {
                if !options.contains(option) {
                    return Err(CommandError::UnknownRuleOption {
                        command: self.name.clone(),
                        option: option.to_string(),
                    });
                }
            }
        }

        let mut actions = view.actions;
        let action = actions.remove(0);

        debug!(command = %self.name, options = options.len(), "Prepared command");

        Ok(PreparedCommand {
            spec: self,
            action,
            options,
        })
    }

    /// Looks the resource up in a provider and prepares the command.
    ///
    /// # Errors
    ///
    /// See [`prepare`](Self::prepare); additionally fails when the provider
    /// does not know the resource.
    pub fn prepare_with<P: SchemaProvider + ?Sized>(
        &self,
        provider: &P,
    ) -> Result<PreparedCommand<'_>> {
        let schema = provider.schema(&self.resource)?;
        self.prepare(schema)
    }
}

/// User input for one invocation: normalized values plus the violations
/// normalization already found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub values: SuppliedValues,
    pub violations: Vec<Violation>,
}

impl From<SuppliedValues> for Invocation {
    fn from(values: SuppliedValues) -> Self {
        Self {
            values,
            violations: Vec::new(),
        }
    }
}

impl From<&SuppliedValues> for Invocation {
    fn from(values: &SuppliedValues) -> Self {
        Self::from(values.clone())
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub response: Response,
    /// The command's success message, if it has one
    pub message: Option<String>,
}

/// A command resolved against its schema, ready to run.
#[derive(Debug, Clone)]
pub struct PreparedCommand<'a> {
    spec: &'a CommandSpec,
    action: ActionSchema,
    options: ResolvedOptionSet,
}

impl<'a> PreparedCommand<'a> {
    /// The command definition.
    pub fn spec(&self) -> &'a CommandSpec {
        self.spec
    }

    /// The resolved options.
    pub fn options(&self) -> &ResolvedOptionSet {
        &self.options
    }

    /// The action the command issues.
    pub fn action(&self) -> &ActionSchema {
        &self.action
    }

    /// Normalizes raw `(option name, text)` pairs typed by the user.
    pub fn parse<'r, I>(&self, raw: I) -> Invocation
    where
        I: IntoIterator<Item = (&'r str, &'r str)>,
    {
        let (values, violations) = SuppliedValues::parse(&self.options, raw);
        Invocation { values, violations }
    }

    /// Evaluates the command's rules.
    pub fn validate(&self, supplied: &SuppliedValues) -> Vec<Violation> {
        validate(&self.options, &self.spec.rules, supplied)
    }

    /// Builds the request for validated values.
    pub fn build_request(&self, supplied: &SuppliedValues) -> Request {
        build_request(&self.spec.resource, &self.action, &self.options, supplied)
    }

    /// Applies the command's post-processing to a response.
    pub fn post_process(&self, response: Response) -> Response {
        self.spec.post_processor.process(response)
    }

    /// Validates, issues the request and post-processes the response.
    ///
    /// Nothing is sent when any violation is found; all of them are
    /// returned together.
    ///
    /// # Errors
    ///
    /// [`CommandError::Validation`] for bad input,
    /// [`CommandError::Transport`] when the request fails, and
    /// [`CommandError::Processing`] when the response body is malformed.
    pub fn run(
        &self,
        transport: &dyn Transport,
        invocation: impl Into<Invocation>,
    ) -> Result<CommandOutcome> {
        let response = self.issue(transport, invocation.into())?;
        Ok(self.outcome(self.post_process(response)))
    }

    /// Like [`run`](Self::run), but returns the response as the transport
    /// gave it.
    ///
    /// For transports that do not answer with server data, such as one that
    /// echoes the request back.
    ///
    /// # Errors
    ///
    /// Same as [`run`](Self::run).
    pub fn run_unprocessed(
        &self,
        transport: &dyn Transport,
        invocation: impl Into<Invocation>,
    ) -> Result<CommandOutcome> {
        let response = self.issue(transport, invocation.into())?;
        Ok(self.outcome(response))
    }

    fn issue(&self, transport: &dyn Transport, invocation: Invocation) -> Result<Response> {
        let Invocation {
            values,
            mut violations,
        } = invocation;
        violations.extend(self.validate(&values));
        if !violations.is_empty() {
            debug!(
                command = %self.spec.name,
                violations = violations.len(),
                "Rejected invocation"
            );
            return Err(CommandError::Validation(violations));
        }

        let request = self.build_request(&values);
        info!(
            resource = %request.resource,
            action = %request.action,
            "Issuing request"
        );

        let body: Value = transport
            .issue(&request)
            .map_err(|source| CommandError::Transport {
                failure_message: self.failure_message(),
                source,
            })?;
        Ok(Response::from_json(body)?)
    }

    fn outcome(&self, response: Response) -> CommandOutcome {
        CommandOutcome {
            response,
            message: self.spec.success_message.clone(),
        }
    }

    fn failure_message(&self) -> String {
        self.spec
            .failure_message
            .clone()
            .unwrap_or_else(|| format!("Could not run {}", self.spec.name))
    }
}
