// Command-line surface
//
// The command tree is built at runtime from the operation registry: one
// subcommand per operation, one flag per input field. Required fields are
// left to the binder so every missing-parameter error looks the same.

use std::ffi::OsString;
use std::path::PathBuf;

use agentctl_config::{CliOverrides, ClientConfig};
use agentctl_core::{
    cancel, naming, prepare, registry, Adapter, AdapterError, ConfirmPolicy, FieldDescriptor,
    FieldKind, InvokeOptions, OperationDescriptor, OutputSink, Outcome, RawInputs, RawValue,
};
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_json::json;
use tracing::debug;

use crate::emit::{adapter_error_record, glue_error_record, print_error_record, JsonSink};
use crate::init::init_tracing;
use crate::{prompt, shutdown};

pub const EXIT_OK: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_CANCELLED: u8 = 130;

const COMMANDS: &str = "commands";

/// Full command tree.
pub fn build_command() -> Command {
    let mut command = Command::new("agentctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command-line client for the Amazon Bedrock AgentCore control plane")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args(global_args())
        .subcommand(
            Command::new(COMMANDS)
                .about("List available operation commands")
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .value_name("TEXT")
                        .help("Only list commands whose name contains TEXT"),
                ),
        );

    for op in registry::operations() {
        command = command.subcommand(operation_command(op));
    }
    command
}

fn global_args() -> Vec<Arg> {
    vec![
        Arg::new("config")
            .long("config")
            .value_name("FILE")
            .value_parser(clap::value_parser!(PathBuf))
            .global(true)
            .help("Path to configuration file"),
        Arg::new("region")
            .long("region")
            .value_name("REGION")
            .global(true)
            .help("AWS region (overrides AWS_REGION and the profile)"),
        Arg::new("profile")
            .long("profile")
            .value_name("NAME")
            .global(true)
            .help("Named AWS profile for credentials and region"),
        Arg::new("endpoint-url")
            .long("endpoint-url")
            .value_name("URL")
            .global(true)
            .help("Send requests to URL instead of the regional endpoint"),
        Arg::new("no-sign-request")
            .long("no-sign-request")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Do not sign requests"),
        Arg::new("output")
            .long("output")
            .value_name("FORMAT")
            .value_parser(["json", "jsonl"])
            .global(true)
            .help("Result format on stdout"),
        Arg::new("log-level")
            .long("log-level")
            .value_name("LEVEL")
            .global(true)
            .help("Log level or filter directive: trace, debug, info, warn, error"),
    ]
}

fn operation_command(op: &'static OperationDescriptor) -> Command {
    let mut command = Command::new(op.command)
        .about(op.summary)
        .long_about(format!("{}\n\nService operation: {}", op.summary, op.name))
        .args(op.inputs.iter().map(field_arg))
        .arg(
            Arg::new("select")
                .long("select")
                .value_name("SELECTOR")
                .help(format!(
                    "Response member to print, '*' for the whole response or '^PARAM' for an input [default: {}]",
                    op.default_select
                )),
        );

    if op.mutating {
        command = command.arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Do not ask for confirmation"),
        );
    }
    if op.is_paginated() {
        command = command.arg(
            Arg::new("no-auto-iteration")
                .long("no-auto-iteration")
                .action(ArgAction::SetTrue)
                .help("Fetch a single page and print the cursor for the next one"),
        );
    }
    command
}

fn field_arg(field: &'static FieldDescriptor) -> Arg {
    let mut help = field.doc.to_string();
    let arg = Arg::new(field.name)
        .long(field.flag())
        .value_name(field.kind.type_name().to_uppercase());

    let arg = match field.kind {
        FieldKind::StringList => arg.action(ArgAction::Append),
        FieldKind::Enum(values) => {
            help.push_str(&format!(" [values: {}]", values.join(", ")));
            arg
        }
        FieldKind::Document => {
            help.push_str(" (inline JSON or file://PATH)");
            arg
        }
        FieldKind::String | FieldKind::Integer => arg,
    };

    if field.required {
        help.push_str(" [required]");
    }
    arg.help(help)
}

/// Collect the operation flags that were given.
pub fn raw_inputs(op: &'static OperationDescriptor, matches: &ArgMatches) -> RawInputs {
    let mut raw = RawInputs::new();
    for field in op.inputs {
        match field.kind {
            FieldKind::StringList => {
                if let Some(values) = matches.get_many::<String>(field.name) {
                    raw.insert(field.name, RawValue::List(values.cloned().collect()));
                }
            }
            _ => {
                if let Some(value) = matches.get_one::<String>(field.name) {
                    raw.insert(field.name, value.as_str());
                }
            }
        }
    }
    raw
}

pub fn invoke_options(
    op: &'static OperationDescriptor,
    matches: &ArgMatches,
    config: &ClientConfig,
) -> InvokeOptions {
    let force = op.mutating && matches.get_flag("force");
    let single_page = op.is_paginated() && matches.get_flag("no-auto-iteration");

    InvokeOptions {
        select: matches.get_one::<String>("select").cloned(),
        confirm: ConfirmPolicy {
            force: force || config.confirm.assume_yes,
        },
        auto_iterate: config.paging.auto_iterate && !single_page,
        page_size: config.paging.page_size,
    }
}

/// Global flags, read from the subcommand's matches where they are propagated.
pub fn cli_overrides(matches: &ArgMatches) -> Result<CliOverrides> {
    let text = |id: &str| matches.get_one::<String>(id).cloned();

    Ok(CliOverrides {
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        region: text("region"),
        profile: text("profile"),
        endpoint_url: text("endpoint-url"),
        no_sign_request: matches.get_flag("no-sign-request"),
        output: text("output").map(|format| format.parse()).transpose()?,
        log_level: text("log-level"),
    })
}

pub fn exit_code(err: &AdapterError) -> u8 {
    if err.is_input_error() {
        EXIT_USAGE
    } else if matches!(err, AdapterError::Cancelled { .. }) {
        EXIT_CANCELLED
    } else {
        EXIT_FAILURE
    }
}

/// Parse `args`, run the selected command and return the exit status.
pub async fn run<I, T>(args: I) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = match build_command().try_get_matches_from(args) {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { EXIT_USAGE } else { EXIT_OK };
        }
    };
    let Some((name, sub)) = matches.subcommand() else {
        return EXIT_USAGE;
    };

    let config = match load_config(sub) {
        Ok(config) => config,
        Err(err) => {
            print_error_record(&glue_error_record("Configuration", &err));
            return EXIT_USAGE;
        }
    };
    init_tracing(&config.log);
    debug!(?config, "configuration loaded");

    if name == COMMANDS {
        return list_commands(sub, &config);
    }
    match registry::find(name) {
        Some(op) => run_operation(op, sub, &config).await,
        None => EXIT_USAGE,
    }
}

fn load_config(matches: &ArgMatches) -> Result<ClientConfig> {
    let overrides = cli_overrides(matches)?;
    ClientConfig::load(&overrides).context("Failed to load configuration")
}

fn list_commands(matches: &ArgMatches, config: &ClientConfig) -> u8 {
    let filter = matches
        .get_one::<String>("filter")
        .map(|text| text.to_lowercase());
    let mut sink = JsonSink::stdout(config.output.format);

    for op in registry::operations() {
        if let Some(filter) = &filter {
            if !op.command.contains(filter.as_str()) && !op.name.to_lowercase().contains(filter) {
                continue;
            }
        }
        let entry = json!({
            "command": op.command,
            "operation": op.name,
            "summary": op.summary,
            "mutating": op.mutating,
            "paginated": op.is_paginated(),
        });
        if let Err(err) = sink.emit(&entry) {
            print_error_record(&glue_error_record("Output", &anyhow::Error::from(err)));
            return EXIT_FAILURE;
        }
    }
    EXIT_OK
}

async fn run_operation(
    op: &'static OperationDescriptor,
    matches: &ArgMatches,
    config: &ClientConfig,
) -> u8 {
    let raw = raw_inputs(op, matches);
    let options = invoke_options(op, matches, config);

    // Validate before any credential or endpoint lookup
    let prepared = match prepare(op, &raw, &options) {
        Ok(prepared) => prepared,
        Err(err) => return report(&err),
    };

    let client = match agentctl_client::connect(config).await {
        Ok(client) => client,
        Err(err) => {
            print_error_record(&glue_error_record("Configuration", &err));
            return EXIT_USAGE;
        }
    };

    let adapter = Adapter::new(client, prompt::confirmer());
    let (handle, token) = cancel::channel();
    let watcher = shutdown::watch_signals(handle);
    let mut sink = JsonSink::stdout(config.output.format);

    let result = adapter.execute(prepared, &mut sink, &token).await;
    watcher.abort();

    match result {
        Ok(Outcome::Completed {
            pages,
            emitted,
            next_cursor,
        }) => {
            debug!(pages, emitted, "completed");
            if let (Some(cursor), Some(paging)) = (next_cursor, op.pagination) {
                eprintln!(
                    "More results available; rerun with --{} {}",
                    naming::kebab_case(paging.input_token),
                    cursor
                );
            }
            EXIT_OK
        }
        Ok(Outcome::Declined) => {
            eprintln!(
                "Declined: {} was not sent. Pass --force to skip confirmation.",
                op.command
            );
            EXIT_OK
        }
        Err(err) => report(&err),
    }
}

fn report(err: &AdapterError) -> u8 {
    print_error_record(&adapter_error_record(err));
    exit_code(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentctl_config::OutputFormat;
    use serde_json::Value;

    fn parse(args: &[&str]) -> (String, ArgMatches) {
        let matches = build_command()
            .try_get_matches_from(std::iter::once("agentctl").chain(args.iter().copied()))
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        (name.to_string(), sub.clone())
    }

    #[test]
    fn test_command_tree_is_consistent() {
        build_command().debug_assert();
    }

    #[test]
    fn test_every_operation_has_a_subcommand() {
        let command = build_command();
        for op in registry::operations() {
            let sub = command
                .find_subcommand(op.command)
                .unwrap_or_else(|| panic!("no subcommand for {}", op.command));
            assert_eq!(
                sub.get_arguments()
                    .any(|arg| arg.get_id().as_str() == "force"),
                op.mutating,
                "{}",
                op.command
            );
        }
    }

    #[test]
    fn test_raw_inputs_from_flags() {
        let (name, matches) = parse(&[
            "remove-resource-tag",
            "--resource-arn",
            "arn:aws:bedrock-agentcore:us-west-2:123456789012:memory/m-1",
            "--tag-keys",
            "team",
            "--tag-keys",
            "env",
        ]);
        let op = registry::find(&name).unwrap();
        let raw = raw_inputs(op, &matches);

        let collected: Vec<(&str, &RawValue)> = raw.iter().collect();
        assert!(collected.contains(&(
            "tagKeys",
            &RawValue::List(vec!["team".into(), "env".into()])
        )));
        assert!(collected.iter().any(|(name, _)| *name == "resourceArn"));
    }

    #[test]
    fn test_missing_required_flag_is_left_to_the_binder() {
        let (name, matches) = parse(&["remove-memory"]);
        let op = registry::find(&name).unwrap();
        let raw = raw_inputs(op, &matches);
        assert!(raw.is_empty());

        let err = prepare(op, &raw, &InvokeOptions::default()).unwrap_err();
        assert!(matches!(err, AdapterError::MissingParameter { .. }));
        assert_eq!(exit_code(&err), EXIT_USAGE);
    }

    #[test]
    fn test_invoke_options_from_flags_and_config() {
        let mut config = ClientConfig::default();
        config.paging.page_size = Some(10);

        let (name, matches) = parse(&["get-memory-list", "--no-auto-iteration"]);
        let op = registry::find(&name).unwrap();
        let options = invoke_options(op, &matches, &config);
        assert!(!options.auto_iterate);
        assert!(!options.confirm.force);
        assert_eq!(options.page_size, Some(10));

        let (name, matches) = parse(&["remove-memory", "--memory-id", "m-1", "--force"]);
        let op = registry::find(&name).unwrap();
        assert!(invoke_options(op, &matches, &config).confirm.force);

        let (name, matches) = parse(&["remove-memory", "--memory-id", "m-1"]);
        let op = registry::find(&name).unwrap();
        assert!(!invoke_options(op, &matches, &config).confirm.force);
        config.confirm.assume_yes = true;
        assert!(invoke_options(op, &matches, &config).confirm.force);
    }

    #[test]
    fn test_global_flags_after_the_subcommand() {
        let (_, matches) = parse(&[
            "get-memory-list",
            "--region",
            "eu-central-1",
            "--output",
            "jsonl",
            "--no-sign-request",
        ]);
        let overrides = cli_overrides(&matches).unwrap();
        assert_eq!(overrides.region.as_deref(), Some("eu-central-1"));
        assert_eq!(overrides.output, Some(OutputFormat::Jsonl));
        assert!(overrides.no_sign_request);
        assert!(overrides.config_path.is_none());
    }

    #[test]
    fn test_unknown_output_format_is_a_usage_error() {
        let err = build_command()
            .try_get_matches_from(["agentctl", "get-memory-list", "--output", "yaml"])
            .unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_exit_codes() {
        let cancelled = AdapterError::Cancelled {
            operation: "ListMemories",
        };
        assert_eq!(exit_code(&cancelled), EXIT_CANCELLED);

        let service = AdapterError::Service {
            operation: "GetMemory",
            status: 404,
            code: "ResourceNotFoundException".into(),
            message: "not found".into(),
            request_id: None,
        };
        assert_eq!(exit_code(&service), EXIT_FAILURE);

        let record = adapter_error_record(&service);
        assert_eq!(record["error"]["code"], Value::from("AC004"));
    }
}
