//! valdesk CLI entry point.

use clap::{ColorChoice, Parser};
use std::io::{self, IsTerminal};

mod cli;
mod commands;
mod logging;

use crate::cli::{Cli, Command, LogFormatArg};
use crate::logging::{LogConfig, LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let config_path = cli.config.as_deref();
    let outcome = match &cli.command {
        Command::Init => commands::run_init(config_path),
        Command::Entities => commands::run_entities(config_path),
        Command::List(args) => commands::run_list(config_path, args),
        Command::Add(args) => commands::run_add(config_path, args),
        Command::Update(args) => commands::run_update(config_path, args),
        Command::Delete(args) => commands::run_delete(config_path, args),
        Command::Queries => commands::run_queries(config_path),
        Command::Run(args) => commands::run_query(config_path, args),
        Command::Export(args) => commands::run_export(config_path, args),
    };
    let exit_code = match outcome {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
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
