//! clap argument wiring for schema-derived options.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use resource_command_core::{OptionSpec, PreparedCommand, ResolvedOptionSet, ValueKind};
use serde_json::Value;

/// Builds the clap subcommand for a prepared command.
pub fn command_for(prepared: &PreparedCommand<'_>) -> Command {
    let spec = prepared.spec();
    let mut command = Command::new(spec.name.clone()).hide(spec.hidden);
    if let Some(description) = &spec.description {
        command = command.about(description.clone());
    }

    for option in prepared.options() {
        command = command.arg(arg_for(option));
    }

    command
}

fn arg_for(option: &OptionSpec) -> Arg {
    let long = option.cli_flag.trim_start_matches('-').to_string();
    let mut arg = Arg::new(option.name.clone()).long(long);

    let mut help = option.description.clone().unwrap_or_default();
    if let ValueKind::Enum(values) = &option.kind {
        let listed: Vec<String> = values.iter().map(|v| format!("'{v}'")).collect();
        help = format!("{help}\nPossible value(s): {}", listed.join(", "))
            .trim_start()
            .to_string();
    }
    if option.kind == ValueKind::List {
        help = format!("{help}\nComma separated list of values.")
            .trim_start()
            .to_string();
    }
    if !help.is_empty() {
        arg = arg.help(help);
    }

    if option.kind.takes_value() {
        arg = arg
            .action(ArgAction::Set)
            .value_name(option.name.to_uppercase())
            .allow_hyphen_values(true);
        if let Some(default) = option.default.as_ref().and_then(default_text) {
            arg = arg.default_value(default);
        }
    } else {
        arg = arg.action(ArgAction::SetTrue);
    }

    arg
}

fn default_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        _ => None,
    }
}

/// Collects the `(option, text)` pairs the user typed.
///
/// Values clap filled in from defaults are skipped; the core fills defaults
/// itself and records them as such.
pub fn explicit_values(matches: &ArgMatches, options: &ResolvedOptionSet) -> Vec<(String, String)> {
    let mut raw = Vec::new();

    for option in options {
        let id = option.name.as_str();
        if matches.value_source(id) != Some(ValueSource::CommandLine) {
            continue;
        }
        if option.kind.takes_value() {
            if let Some(text) = matches.get_one::<String>(id) {
                raw.push((option.name.clone(), text.clone()));
            }
        } else if matches.get_flag(id) {
            raw.push((option.name.clone(), "true".to_string()));
        }
    }

    raw
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options() -> ResolvedOptionSet {
        ResolvedOptionSet::from_options(vec![
            OptionSpec::new("name", ValueKind::String),
            OptionSpec::new("parameter_type", ValueKind::Enum(vec!["string".into()]))
                .with_default(json!("string")),
            OptionSpec::new("override_value_order", ValueKind::List),
            OptionSpec::new("hidden", ValueKind::Flag),
        ])
    }

    fn command(options: &ResolvedOptionSet) -> Command {
        options
            .iter()
            .fold(Command::new("update"), |c, o| c.arg(arg_for(o)))
    }

    #[test]
    fn test_defaults_are_not_explicit() {
        let options = options();
        let matches = command(&options)
            .try_get_matches_from(["update", "--name", "ntp_servers"])
            .unwrap();

        assert_eq!(
            matches.get_one::<String>("parameter_type").map(String::as_str),
            Some("string")
        );
        assert_eq!(
            explicit_values(&matches, &options),
            vec![("name".to_string(), "ntp_servers".to_string())]
        );
    }

    #[test]
    fn test_flags_and_lists_are_collected() {
        let options = options();
        let matches = command(&options)
            .try_get_matches_from([
                "update",
                "--override-value-order",
                "fqdn,os",
                "--hidden",
                "--parameter-type",
                "string",
            ])
            .unwrap();

        assert_eq!(
            explicit_values(&matches, &options),
            vec![
                ("parameter_type".to_string(), "string".to_string()),
                ("override_value_order".to_string(), "fqdn,os".to_string()),
                ("hidden".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_enum_values_listed_in_help() {
        let options = options();
        let arg = arg_for(options.get("parameter_type").unwrap());
        let help = arg.get_help().map(ToString::to_string).unwrap_or_default();
        assert_eq!(help, "Possible value(s): 'string'");
    }
}
