//! Supplied option values and per-kind normalization.
//!
//! Validation rules key off whether the user actually typed an option, not
//! off its resolved value, so every value remembers its [`ValueSource`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::derive::ResolvedOptionSet;
use crate::rules::Violation;
use crate::types::ValueKind;

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Typed by the user.
    Explicit,
    /// Filled in from the option's default.
    Default,
}

/// One option value together with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuppliedValue {
    pub value: Value,
    pub source: ValueSource,
}

/// Values of one invocation keyed by option name.
///
/// # Examples
///
/// ```
/// use resource_command_core::*;
/// use serde_json::json;
///
/// let options = ResolvedOptionSet::from_options(vec![
///     OptionSpec::new("name", ValueKind::String),
///     OptionSpec::new("use_puppet_default", ValueKind::Bool).with_default(json!(false)),
/// ]);
///
/// let (values, violations) = SuppliedValues::parse(&options, [("name", "ntp_servers")]);
/// assert!(violations.is_empty());
/// assert!(values.is_explicit("name"));
/// assert!(!values.is_explicit("use_puppet_default"));
/// assert_eq!(values.value("use_puppet_default"), Some(&json!(false)));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SuppliedValues {
    values: BTreeMap<String, SuppliedValue>,
}

impl SuppliedValues {
    /// Creates an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses raw strings typed by the user and fills in defaults.
    ///
    /// Values that fail normalization, and names the option set does not
    /// know, are returned as violations; the remaining values are kept.
    pub fn parse<'a, I>(options: &ResolvedOptionSet, raw: I) -> (Self, Vec<Violation>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut values = Self::new();
        let mut violations = Vec::new();

        for (name, input) in raw {
            let Some(option) = options.get(name) else {
                violations.push(Violation::UnknownOption {
                    option: name.to_string(),
                });
                continue;
            };
            match normalize(&option.kind, input) {
                Ok(value) => values.set(name, value),
                Err(reason) => violations.push(Violation::InvalidValue {
                    option: option.name.clone(),
                    flag: option.cli_flag.clone(),
                    value: input.to_string(),
                    reason,
                }),
            }
        }

        values.fill_defaults(options);
        (values, violations)
    }

    /// Records an explicitly supplied value.
    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(
            name.to_string(),
            SuppliedValue {
                value,
                source: ValueSource::Explicit,
            },
        );
    }

    /// Records an explicitly supplied value, builder style.
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Records a default value unless the option already has one.
    pub fn set_default(&mut self, name: &str, value: Value) {
        self.values
            .entry(name.to_string())
            .or_insert(SuppliedValue {
                value,
                source: ValueSource::Default,
            });
    }

    /// Fills in declared defaults for options without a value.
    pub fn fill_defaults(&mut self, options: &ResolvedOptionSet) {
        for option in options {
            if let Some(default) = &option.default {
                self.set_default(&option.name, default.clone());
            }
        }
    }

    /// Looks up a value with its source.
    pub fn get(&self, name: &str) -> Option<&SuppliedValue> {
        self.values.get(name)
    }

    /// Resolved value, explicit or default.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).map(|v| &v.value)
    }

    /// Returns `true` if the user supplied the option.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.values
            .get(name)
            .is_some_and(|v| v.source == ValueSource::Explicit)
    }

    /// Iterates over values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SuppliedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if no value is present.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Normalizes a raw command-line string for a value kind.
///
/// # Errors
///
/// Returns a human-readable reason when the input is not acceptable for the
/// kind.
///
/// # Examples
///
/// ```
/// use resource_command_core::{ValueKind, normalize};
/// use serde_json::json;
///
/// assert_eq!(normalize(&ValueKind::Bool, "yes").unwrap(), json!(true));
/// assert_eq!(normalize(&ValueKind::List, "a,b,c").unwrap(), json!(["a", "b", "c"]));
/// assert!(normalize(&ValueKind::Enum(vec!["regexp".into()]), "glob").is_err());
/// ```
pub fn normalize(kind: &ValueKind, raw: &str) -> Result<Value, String> {
    match kind {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Number => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| "Numeric value is required.".to_string()),
        ValueKind::Bool => parse_bool(raw)
            .map(Value::Bool)
            .ok_or_else(|| "Value must be one of true/false, yes/no, 1/0.".to_string()),
        ValueKind::Flag => Ok(Value::Bool(parse_bool(raw).unwrap_or(true))),
        ValueKind::Enum(allowed) => {
            if allowed.iter().any(|a| a == raw) {
                Ok(Value::String(raw.to_string()))
            } else {
                let quoted: Vec<String> = allowed.iter().map(|a| format!("'{a}'")).collect();
                Err(format!("Value must be one of {}.", quoted.join(", ")))
            }
        }
        ValueKind::List => Ok(Value::Array(
            split_list(raw).into_iter().map(Value::String).collect(),
        )),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Splits a comma-separated list; `\,` keeps a literal comma.
fn split_list(raw: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                current.push(',');
                chars.next();
            }
            ',' => items.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    items.push(current);

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::types::OptionSpec;

    use super::*;

    #[test]
    fn test_bool_normalizer_accepts_common_spellings() {
        for raw in ["true", "YES", "y", "1", "t"] {
            assert_eq!(normalize(&ValueKind::Bool, raw).unwrap(), json!(true), "{raw}");
        }
        for raw in ["false", "No", "n", "0", "f"] {
            assert_eq!(normalize(&ValueKind::Bool, raw).unwrap(), json!(false), "{raw}");
        }
        assert!(normalize(&ValueKind::Bool, "maybe").is_err());
    }

    #[test]
    fn test_enum_normalizer_allows_empty_member() {
        let kind = ValueKind::Enum(vec!["regexp".into(), "list".into(), "".into()]);
        assert_eq!(normalize(&kind, "").unwrap(), json!(""));
        let err = normalize(&kind, "glob").unwrap_err();
        assert_eq!(err, "Value must be one of 'regexp', 'list', ''.");
    }

    #[test]
    fn test_list_normalizer_handles_escapes_and_blanks() {
        assert_eq!(
            normalize(&ValueKind::List, "fqdn, hostgroup,,os").unwrap(),
            json!(["fqdn", "hostgroup", "os"])
        );
        assert_eq!(
            normalize(&ValueKind::List, r"a\,b,c").unwrap(),
            json!(["a,b", "c"])
        );
        assert_eq!(normalize(&ValueKind::List, "").unwrap(), json!([]));
    }

    #[test]
    fn test_number_normalizer() {
        assert_eq!(normalize(&ValueKind::Number, " 42 ").unwrap(), json!(42));
        assert!(normalize(&ValueKind::Number, "forty").is_err());
    }

    #[test]
    fn test_parse_collects_every_bad_value() {
        let options = ResolvedOptionSet::from_options(vec![
            OptionSpec::new("override", ValueKind::Bool),
            OptionSpec::new("required", ValueKind::Bool),
            OptionSpec::new("default_value", ValueKind::String),
        ]);

        let (values, violations) = SuppliedValues::parse(
            &options,
            [
                ("override", "sure"),
                ("required", "nope"),
                ("default_value", "x"),
                ("bogus", "1"),
            ],
        );

        assert_eq!(violations.len(), 3);
        assert!(values.is_explicit("default_value"));
        assert!(!values.is_explicit("override"));
    }

    #[test]
    fn test_explicit_value_is_not_replaced_by_default() {
        let options = ResolvedOptionSet::from_options(vec![
            OptionSpec::new("use_puppet_default", ValueKind::Bool).with_default(json!(false)),
        ]);

        let (values, _) = SuppliedValues::parse(&options, [("use_puppet_default", "true")]);
        let supplied = values.get("use_puppet_default").unwrap();
        assert_eq!(supplied.value, json!(true));
        assert_eq!(supplied.source, ValueSource::Explicit);
    }
}
