//! Error types for option derivation and command execution.
//!
//! Definition-time failures ([`SchemaError`], [`CompositionError`],
//! [`DeriveError`]) are programmer errors surfaced when a command is
//! prepared. Runtime failures are collected in [`CommandError`].

use thiserror::Error;

use crate::rules::Violation;
use crate::transport::TransportError;
use crate::validate::ValidationError;

/// Schema lookup failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The provider knows no resource with this name.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// The resource has no such action.
    #[error("resource '{resource}' has no action '{action}'")]
    UnknownAction { resource: String, action: String },

    /// The schema source could not be loaded.
    #[error("schema source unavailable: {0}")]
    Unavailable(String),
}

/// Directive construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// Two added options share a name but disagree on the value kind.
    #[error("option '{name}' declared twice with incompatible kinds ({first} vs {second})")]
    ConflictingOption {
        name: String,
        first: &'static str,
        second: &'static str,
    },
}

/// Derivation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    /// A directive names an association the resource does not declare.
    #[error("resource '{resource}' has no association '{association}'")]
    UnknownAssociation {
        resource: String,
        association: String,
    },
}

/// Response post-processing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    /// A record is not a JSON object.
    #[error("malformed record: expected an object, got {0}")]
    MalformedRecord(String),

    /// The response body has an unexpected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors produced while preparing or running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Schema lookup failure.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Option derivation failure.
    #[error(transparent)]
    Derive(#[from] DeriveError),

    /// A validation rule references an option the command does not have.
    #[error("command '{command}' has a rule referencing unknown option '{option}'")]
    UnknownRuleOption { command: String, option: String },

    /// The derived options cannot be exposed as command-line flags.
    #[error("command '{command}' has an invalid option: {source}")]
    InvalidOption {
        command: String,
        #[source]
        source: ValidationError,
    },

    /// User input failed validation; nothing was sent.
    #[error("{}", render_violations(.0))]
    Validation(Vec<Violation>),

    /// The request failed.
    #[error("{failure_message}: {source}")]
    Transport {
        failure_message: String,
        #[source]
        source: TransportError,
    },

    /// The response could not be post-processed.
    #[error(transparent)]
    Processing(#[from] ProcessingError),
}

fn render_violations(violations: &[Violation]) -> String {
    let lines: Vec<String> = violations.iter().map(|v| format!("  {v}")).collect();
    format!("Could not validate options:\n{}", lines.join("\n"))
}

/// Convenience alias for results with [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;
