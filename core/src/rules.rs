//! Conditional validation rules and their interpreter.
//!
//! Commands declare rules as data; [`validate`] evaluates all of them
//! against the supplied values and returns every violation it finds, so the
//! user sees all problems at once.
//!
//! # Example
//!
//! ```
//! use resource_command_core::*;
//! use serde_json::json;
//!
//! let options = ResolvedOptionSet::from_options(vec![
//!     OptionSpec::new("value", ValueKind::String),
//!     OptionSpec::new("use_puppet_default", ValueKind::Bool),
//! ]);
//! let rules = vec![
//!     ValidationRule::rejected_when("value", "use_puppet_default", json!(true))
//!         .with_message("Cannot use {subject} when {condition} is true."),
//! ];
//!
//! let supplied = SuppliedValues::new()
//!     .with("value", json!("x"))
//!     .with("use_puppet_default", json!(true));
//! let violations = validate(&options, &rules, &supplied);
//! assert_eq!(
//!     violations[0].to_string(),
//!     "Cannot use --value when --use-puppet-default is true."
//! );
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::derive::ResolvedOptionSet;
use crate::values::SuppliedValues;

/// How many candidates of an [`ValidationRule::AnyRequired`] rule may be
/// supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Cardinality {
    /// One or more.
    #[default]
    AtLeastOne,
    /// Exactly one.
    ExactlyOne,
}

/// A cross-option validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationRule {
    /// The option must always be supplied.
    Required { option: String },
    /// The option must be supplied when `trigger` is.
    RequiredWhen { option: String, trigger: String },
    /// When `trigger` is supplied (or always, without a trigger), candidates
    /// must be supplied according to `cardinality`.
    AnyRequired {
        trigger: Option<String>,
        candidates: Vec<String>,
        cardinality: Cardinality,
    },
    /// `subject` must not be supplied while `condition_option` resolves to
    /// `condition_value`.
    ///
    /// The message may use `{subject}` and `{condition}`, which expand to
    /// the options' flags.
    RejectedWhen {
        subject: String,
        condition_option: String,
        condition_value: Value,
        message: Option<String>,
    },
}

impl ValidationRule {
    /// Unconditional requirement.
    pub fn required(option: &str) -> Self {
        Self::Required {
            option: option.to_string(),
        }
    }

    /// Requirement triggered by another option.
    pub fn required_when(option: &str, trigger: &str) -> Self {
        Self::RequiredWhen {
            option: option.to_string(),
            trigger: trigger.to_string(),
        }
    }

    /// At least one of `candidates` when `trigger` is supplied.
    pub fn any_required(trigger: &str, candidates: &[&str]) -> Self {
        Self::AnyRequired {
            trigger: Some(trigger.to_string()),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            cardinality: Cardinality::AtLeastOne,
        }
    }

    /// At least one of `candidates`, unconditionally.
    pub fn any_of(candidates: &[&str]) -> Self {
        Self::AnyRequired {
            trigger: None,
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            cardinality: Cardinality::AtLeastOne,
        }
    }

    /// `subject` is rejected while `condition_option` equals `value`.
    pub fn rejected_when(subject: &str, condition_option: &str, value: Value) -> Self {
        Self::RejectedWhen {
            subject: subject.to_string(),
            condition_option: condition_option.to_string(),
            condition_value: value,
            message: None,
        }
    }

    /// Requires exactly one candidate instead of at least one. No effect on
    /// other rule shapes.
    pub fn exactly_one(mut self) -> Self {
        if let Self::AnyRequired { cardinality, .. } = &mut self {
            *cardinality = Cardinality::ExactlyOne;
        }
        self
    }

    /// Sets the rejection message. No effect on other rule shapes.
    pub fn with_message(mut self, text: &str) -> Self {
        if let Self::RejectedWhen { message, .. } = &mut self {
            *message = Some(text.to_string());
        }
        self
    }

    /// Names of every option the rule looks at.
    pub fn referenced_options(&self) -> Vec<&str> {
        match self {
            Self::Required { option } => vec![option.as_str()],
            Self::RequiredWhen { option, trigger } => vec![option.as_str(), trigger.as_str()],
            Self::AnyRequired {
                trigger,
                candidates,
                ..
            } => trigger
                .iter()
                .chain(candidates.iter())
                .map(String::as_str)
                .collect(),
            Self::RejectedWhen {
                subject,
                condition_option,
                ..
            } => vec![subject.as_str(), condition_option.as_str()],
        }
    }
}

/// A single failed rule or unusable value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// An unconditionally required option is missing.
    #[error("Option {flag} is required.")]
    MissingRequired { option: String, flag: String },

    /// A required option is missing while its trigger is supplied.
    #[error("Option {flag} is required when {trigger_flag} is used.")]
    MissingRequiredWhen {
        option: String,
        flag: String,
        trigger: String,
        trigger_flag: String,
    },

    /// None of the candidates was supplied.
    #[error("One of options {} is required{}.", .flags.join(", "), when_clause(.trigger_flag))]
    AnyRequired {
        trigger: Option<String>,
        trigger_flag: Option<String>,
        candidates: Vec<String>,
        flags: Vec<String>,
    },

    /// More than one candidate was supplied to an exactly-one rule.
    #[error("Only one of options {} can be used{}.", .flags.join(", "), when_clause(.trigger_flag))]
    TooManyOf {
        trigger: Option<String>,
        trigger_flag: Option<String>,
        candidates: Vec<String>,
        flags: Vec<String>,
    },

    /// The subject was supplied while its rejection condition holds.
    #[error("{message}")]
    Rejected {
        subject: String,
        condition_option: String,
        message: String,
    },

    /// A value could not be normalized.
    #[error("Option {flag}: {reason}")]
    InvalidValue {
        option: String,
        flag: String,
        value: String,
        reason: String,
    },

    /// A value was given for an option the command does not have.
    #[error("Unknown option '{option}'.")]
    UnknownOption { option: String },
}

fn when_clause(trigger_flag: &Option<String>) -> String {
    trigger_flag
        .as_ref()
        .map(|flag| format!(" when {flag} is used"))
        .unwrap_or_default()
}

/// Evaluates every rule and collects all violations.
pub fn validate(
    options: &ResolvedOptionSet,
    rules: &[ValidationRule],
    supplied: &SuppliedValues,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in rules {
        match rule {
            ValidationRule::Required { option } => {
                if !supplied.is_explicit(option) {
                    violations.push(Violation::MissingRequired {
                        option: option.clone(),
                        flag: options.flag_for(option),
                    });
                }
            }
            ValidationRule::RequiredWhen { option, trigger } => {
                if supplied.is_explicit(trigger) && !supplied.is_explicit(option) {
                    violations.push(Violation::MissingRequiredWhen {
                        option: option.clone(),
                        flag: options.flag_for(option),
                        trigger: trigger.clone(),
                        trigger_flag: options.flag_for(trigger),
                    });
                }
            }
            ValidationRule::AnyRequired {
                trigger,
                candidates,
                cardinality,
            } => {
                if let Some(trigger) = trigger {
                    if !supplied.is_explicit(trigger) {
                        continue;
                    }
                }
                let present = candidates
                    .iter()
                    .filter(|c| supplied.is_explicit(c))
                    .count();
                let flags = candidates.iter().map(|c| options.flag_for(c)).collect();
                let trigger_flag = trigger.as_deref().map(|t| options.flag_for(t));

                if present == 0 {
                    violations.push(Violation::AnyRequired {
                        trigger: trigger.clone(),
                        trigger_flag,
                        candidates: candidates.clone(),
                        flags,
                    });
                } else if present > 1 && *cardinality == Cardinality::ExactlyOne {
                    violations.push(Violation::TooManyOf {
                        trigger: trigger.clone(),
                        trigger_flag,
                        candidates: candidates.clone(),
                        flags,
                    });
                }
            }
            ValidationRule::RejectedWhen {
                subject,
                condition_option,
                condition_value,
                message,
            } => {
                let condition_holds = supplied.value(condition_option) == Some(condition_value);
                if condition_holds && supplied.is_explicit(subject) {
                    let subject_flag = options.flag_for(subject);
                    let condition_flag = options.flag_for(condition_option);
                    let message = match message {
                        Some(template) => template
                            .replace("{subject}", &subject_flag)
                            .replace("{condition}", &condition_flag),
                        None => format!(
                            "Cannot use {subject_flag} when {condition_flag} is {}.",
                            display_value(condition_value)
                        ),
                    };
                    violations.push(Violation::Rejected {
                        subject: subject.clone(),
                        condition_option: condition_option.clone(),
                        message,
                    });
                }
            }
        }
    }

    debug!(
        rules = rules.len(),
        violations = violations.len(),
        "Evaluated validation rules"
    );

    violations
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::types::{OptionSpec, ValueKind};

    use super::*;

    fn matcher_options() -> ResolvedOptionSet {
        ResolvedOptionSet::from_options(vec![
            OptionSpec::new("smart_class_parameter_name", ValueKind::String),
            OptionSpec::new("puppetclass_id", ValueKind::String),
            OptionSpec::new("puppetclass_name", ValueKind::String),
            OptionSpec::new("value", ValueKind::String),
            OptionSpec::new("use_puppet_default", ValueKind::Bool).with_default(json!(false)),
        ])
    }

    fn class_rule() -> ValidationRule {
        ValidationRule::any_required(
            "smart_class_parameter_name",
            &["puppetclass_name", "puppetclass_id"],
        )
    }

    #[test]
    fn test_any_required_missing_candidates() {
        let supplied = SuppliedValues::new().with("smart_class_parameter_name", json!("ntp"));

        let violations = validate(&matcher_options(), &[class_rule()], &supplied);
        assert_eq!(
            violations,
            vec![Violation::AnyRequired {
                trigger: Some("smart_class_parameter_name".to_string()),
                trigger_flag: Some("--smart-class-parameter-name".to_string()),
                candidates: vec!["puppetclass_name".to_string(), "puppetclass_id".to_string()],
                flags: vec!["--puppetclass-name".to_string(), "--puppetclass-id".to_string()],
            }]
        );
        assert_eq!(
            violations[0].to_string(),
            "One of options --puppetclass-name, --puppetclass-id is required when \
             --smart-class-parameter-name is used."
        );
    }

    #[test]
    fn test_any_required_satisfied_by_one_candidate() {
        let supplied = SuppliedValues::new()
            .with("smart_class_parameter_name", json!("ntp"))
            .with("puppetclass_id", json!("4"));

        assert!(validate(&matcher_options(), &[class_rule()], &supplied).is_empty());
    }

    #[test]
    fn test_any_required_ignored_without_trigger() {
        let supplied = SuppliedValues::new().with("value", json!("x"));
        assert!(validate(&matcher_options(), &[class_rule()], &supplied).is_empty());
    }

    #[test]
    fn test_trigger_from_default_does_not_fire() {
        let mut supplied = SuppliedValues::new();
        supplied.set_default("smart_class_parameter_name", json!("ntp"));
        assert!(validate(&matcher_options(), &[class_rule()], &supplied).is_empty());
    }

    #[test]
    fn test_exactly_one_rejects_both_candidates() {
        let supplied = SuppliedValues::new()
            .with("smart_class_parameter_name", json!("ntp"))
            .with("puppetclass_id", json!("4"))
            .with("puppetclass_name", json!("ntp"));

        let rule = class_rule().exactly_one();
        let violations = validate(&matcher_options(), &[rule], &supplied);
        assert!(matches!(violations.as_slice(), [Violation::TooManyOf { .. }]));

        // at-least-one accepts both
        assert!(validate(&matcher_options(), &[class_rule()], &supplied).is_empty());
    }

    #[test]
    fn test_rejected_when_condition_true() {
        let rule = ValidationRule::rejected_when("value", "use_puppet_default", json!(true));
        let supplied = SuppliedValues::new()
            .with("value", json!("x"))
            .with("use_puppet_default", json!(true));

        let violations = validate(&matcher_options(), &[rule], &supplied);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].to_string(),
            "Cannot use --value when --use-puppet-default is true."
        );
    }

    #[test]
    fn test_rejected_when_condition_false() {
        let rule = ValidationRule::rejected_when("value", "use_puppet_default", json!(true));
        let supplied = SuppliedValues::new()
            .with("value", json!("x"))
            .with("use_puppet_default", json!(false));

        assert!(validate(&matcher_options(), &[rule], &supplied).is_empty());
    }

    #[test]
    fn test_rule_shapes_report_independently() {
        let rules = vec![
            class_rule(),
            ValidationRule::rejected_when("value", "use_puppet_default", json!(true)),
            ValidationRule::required("value"),
        ];
        let supplied = SuppliedValues::new()
            .with("smart_class_parameter_name", json!("ntp"))
            .with("use_puppet_default", json!(true));

        let violations = validate(&matcher_options(), &rules, &supplied);
        assert_eq!(violations.len(), 2);
        assert!(matches!(violations[0], Violation::AnyRequired { .. }));
        assert!(matches!(violations[1], Violation::MissingRequired { .. }));
    }

    #[test]
    fn test_required_when() {
        let rule = ValidationRule::required_when("puppetclass_id", "value");
        let supplied = SuppliedValues::new().with("value", json!("x"));

        let violations = validate(&matcher_options(), &[rule], &supplied);
        assert_eq!(
            violations[0].to_string(),
            "Option --puppetclass-id is required when --value is used."
        );
    }

    #[test]
    fn test_any_of_without_trigger() {
        let rule = ValidationRule::any_of(&["puppetclass_name", "puppetclass_id"]);
        let violations = validate(&matcher_options(), &[rule], &SuppliedValues::new());
        assert_eq!(
            violations[0].to_string(),
            "One of options --puppetclass-name, --puppetclass-id is required."
        );
    }
}
