use std::path::PathBuf;

use clap::{ArgAction, ArgMatches, Command, Parser, Subcommand};
use resource_command_core::PreparedCommand;
use resource_command_db::{CliConfig, LazySchemaDatabase, OutputFormat, SchemaDatabase};
use serde_json::json;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod args;
mod output;
mod smart_class_parameter;
mod transport;

use smart_class_parameter::CommandGroup;
use transport::{DryRunTransport, FixtureTransport};

const BINARY: &str = "sc-param";

/// Schema bundle compiled into the binary, used when no `--schema` source
/// loads.
pub(crate) const EMBEDDED_SCHEMAS: &str = include_str!("../schemas/foreman.json");

#[derive(Debug, Parser)]
#[command(name = BINARY, version)]
#[command(about = "Manage smart class parameters and their override values")]
#[command(after_help = "Command groups: smart-class-parameter, host, hostgroup, puppet-class, environment")]
struct Cli {
    /// Schema directory or bundle file; repeat to build a fallback chain.
    #[arg(long = "schema", value_name = "PATH")]
    schemas: Vec<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// File of canned responses; without one, requests are printed instead
    /// of sent.
    #[arg(long)]
    fixtures: Option<PathBuf>,
    /// Output format (json or yaml).
    #[arg(long)]
    output: Option<OutputFormat>,
    /// Enable debug logging.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<TopLevel>,
}

#[derive(Debug, Subcommand)]
enum TopLevel {
    /// A command group followed by a command and its options.
    #[command(external_subcommand)]
    Group(Vec<String>),
}

/// Settings after merging flags over the configuration file.
struct Settings {
    schemas: Vec<PathBuf>,
    fixtures: Option<PathBuf>,
    output: OutputFormat,
    per_page: Option<u32>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => CliConfig::default(),
    };
    init_tracing(&config, cli.verbose);

    let settings = Settings {
        schemas: if cli.schemas.is_empty() {
            config.schemas.clone()
        } else {
            cli.schemas.clone()
        },
        fixtures: cli.fixtures.clone().or_else(|| config.fixtures.clone()),
        output: cli.output.unwrap_or(config.output),
        per_page: config.per_page,
    };

    let builder = settings
        .schemas
        .iter()
        .fold(SchemaDatabase::builder(), |b, path| b.from_path(path))
        .with_embedded(EMBEDDED_SCHEMAS);
    let provider = LazySchemaDatabase::new(builder);

    let groups = smart_class_parameter::groups().map_err(|err| err.to_string())?;
    let registry = Registry::prepare(&groups, &provider)?;
    let mut root = registry.command();

    let Some(TopLevel::Group(rest)) = cli.command else {
        return root.print_help().map_err(|err| err.to_string());
    };

    let argv = std::iter::once(BINARY.to_string()).chain(rest);
    let matches = root.try_get_matches_from_mut(argv).unwrap_or_else(|err| err.exit());
    registry.dispatch(&matches, &settings)
}

fn init_tracing(config: &CliConfig, verbose: u8) {
    let fallback = match verbose {
        0 => config.log_filter.clone().unwrap_or_else(|| "warn".to_string()),
        _ => "debug".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Every command prepared against its schema, grouped as on the command
/// line.
struct Registry<'a> {
    groups: Vec<(&'a CommandGroup, Vec<PreparedCommand<'a>>)>,
}

impl<'a> Registry<'a> {
    fn prepare(groups: &'a [CommandGroup], provider: &LazySchemaDatabase) -> Result<Self, String> {
        let mut prepared_groups = Vec::with_capacity(groups.len());
        for group in groups {
            let prepared = group
                .commands
                .iter()
                .map(|spec| spec.prepare_with(provider))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| err.to_string())?;
            prepared_groups.push((group, prepared));
        }
        debug!(groups = prepared_groups.len(), "Prepared command registry");
        Ok(Self {
            groups: prepared_groups,
        })
    }

    fn command(&self) -> Command {
        let mut root = Command::new(BINARY)
            .subcommand_required(true)
            .arg_required_else_help(true);

        for (group, commands) in &self.groups {
            let mut sub = Command::new(group.name)
                .about(group.about.clone())
                .subcommand_required(true)
                .arg_required_else_help(true);

            for prepared in commands {
                let command = args::command_for(prepared);
                for alias in &prepared.spec().aliases {
                    let mut aliased = command.clone().name(alias.name.clone()).hide(alias.hidden);
                    if let Some(description) = &alias.description {
                        aliased = aliased.about(description.clone());
                    }
                    sub = sub.subcommand(aliased);
                }
                sub = sub.subcommand(command);
            }
            root = root.subcommand(sub);
        }

        root
    }

    fn dispatch(&self, matches: &ArgMatches, settings: &Settings) -> Result<(), String> {
        let Some((group_name, group_matches)) = matches.subcommand() else {
            return Err("no command group given".to_string());
        };
        let Some((command_name, command_matches)) = group_matches.subcommand() else {
            return Err(format!("no command given for '{group_name}'"));
        };

        let prepared = self
            .groups
            .iter()
            .filter(|(group, _)| group.name == group_name)
            .flat_map(|(_, commands)| commands)
            .find(|p| {
                p.spec().name == command_name || p.spec().find_alias(command_name).is_some()
            })
            .ok_or_else(|| format!("unknown command '{group_name} {command_name}'"))?;

        if let Some(alias) = prepared.spec().find_alias(command_name) {
            if let Some(warning) = &alias.warning {
                warn!(alias = %alias.name, "Deprecated command used");
                eprintln!("Warning: {warning}");
            }
        }

        let raw = args::explicit_values(command_matches, prepared.options());
        let mut invocation = prepared.parse(raw.iter().map(|(n, v)| (n.as_str(), v.as_str())));
        if let Some(per_page) = settings.per_page {
            if prepared.options().contains("per_page") {
                invocation.values.set_default("per_page", json!(per_page));
            }
        }

        // The dry-run echo is the request, not server data.
        let outcome = match &settings.fixtures {
            Some(path) => prepared.run(&FixtureTransport::load(path)?, invocation),
            None => prepared.run_unprocessed(&DryRunTransport, invocation),
        }
        .map_err(|err| err.to_string())?;
        print!("{}", output::render(&outcome, settings.output)?);
        Ok(())
    }
}
