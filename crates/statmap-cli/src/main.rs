//! statmap CLI.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use statmap_cli::commands::{
    run_create, run_delete, run_list, run_override, run_reconcile, run_review,
};
use statmap_cli::logging::{LogConfig, LogFormat, init_logging};
use statmap_cli::types::{CreateRequest, OverrideRequest, ReconcileRequest};
use statmap_map::{AutoMapOptions, LabelMatching, MappingPath, MappingUpdate};
use tracing::level_filters::LevelFilter;

mod cli;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg, OverrideArgs, OverrideTarget};
use crate::summary::{print_created, print_entry, print_list, print_reconcile, print_review};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(cli.command) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Create(args) => {
            let request = CreateRequest {
                store_dir: args.store.store,
                source_version: args.source_version,
                source_meta: args.source,
                target_version: args.target_version,
                target_meta: args.target,
                options: AutoMapOptions {
                    label_matching: if args.ignore_label_case {
                        LabelMatching::IgnoreCase
                    } else {
                        LabelMatching::Exact
                    },
                    use_old_codes: !args.no_old_codes,
                },
            };
            print_created(&run_create(&request)?);
        }
        Command::Override(args) => {
            let request = override_request(args)?;
            print_entry(&run_override(&request)?);
        }
        Command::Review(args) => {
            let review = run_review(&args.record.store.store, &args.record.version)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&review)?);
            } else {
                print_review(&review);
            }
        }
        Command::List(args) => print_list(&run_list(&args.store)?),
        Command::Reconcile(args) => {
            let request = ReconcileRequest {
                meta: args.meta,
                selected: args.selected,
                flat: args.flat,
            };
            print_reconcile(&run_reconcile(&request)?);
        }
        Command::Delete(args) => {
            run_delete(&args.store.store, &args.version)?;
            println!("Deleted mapping for {}", args.version);
        }
    }
    Ok(())
}

fn override_request(args: OverrideArgs) -> Result<OverrideRequest> {
    let (target, entry) = match args.target {
        OverrideTarget::Location { level, entry } => (
            MappingPath::location_option(level, entry.source_key.clone()),
            entry,
        ),
        OverrideTarget::Filter { filter_key, entry } => (
            MappingPath::filter_option(filter_key, entry.source_key.clone()),
            entry,
        ),
        OverrideTarget::Indicator { entry } => {
            (MappingPath::indicator(entry.source_key.clone()), entry)
        }
    };
    let update = MappingUpdate::from_parts(entry.mapping_type.into(), entry.candidate)?;
    Ok(OverrideRequest {
        store_dir: args.record.store.store,
        version: args.record.version,
        target,
        update,
    })
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
