//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "valdesk",
    version,
    about = "Value measurement data entry and query runner",
    long_about = "Maintain the value-measurement database (initiatives, events,\n\
                  metrics, plans, and their junction/value tables) and run the\n\
                  stored read-only queries, with CSV export of results."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Explicit config file (default: ./valdesk.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the data directory and seed the starter stored queries.
    Init,

    /// List all entities and their key columns.
    Entities,

    /// Show every record of one entity.
    List(EntityArgs),

    /// Add a record; unset fields are stored as null.
    Add(AddArgs),

    /// Patch the record addressed by --where with the --set fields.
    Update(UpdateArgs),

    /// Delete the record addressed by --where.
    Delete(DeleteArgs),

    /// List the stored queries.
    Queries,

    /// Run a stored query by title and show the result.
    Run(QueryArgs),

    /// Run a stored query and export the result to CSV.
    Export(ExportArgs),
}

#[derive(Parser)]
pub struct EntityArgs {
    /// Entity name, e.g. `initiative` or `event_plan`.
    #[arg(value_name = "ENTITY")]
    pub entity: String,
}

#[derive(Parser)]
pub struct AddArgs {
    #[arg(value_name = "ENTITY")]
    pub entity: String,

    /// Field assignment, repeatable: --set metric_name=Revenue
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,
}

#[derive(Parser)]
pub struct UpdateArgs {
    #[arg(value_name = "ENTITY")]
    pub entity: String,

    /// Key condition, repeatable for composite keys: --where event_id=ab12cd34
    #[arg(long = "where", value_name = "KEY=VALUE", required = true)]
    pub conditions: Vec<String>,

    /// Field assignment, repeatable: --set metric_name=Revenue
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    pub set: Vec<String>,
}

#[derive(Parser)]
pub struct DeleteArgs {
    #[arg(value_name = "ENTITY")]
    pub entity: String,

    /// Key condition, repeatable for composite keys.
    #[arg(long = "where", value_name = "KEY=VALUE", required = true)]
    pub conditions: Vec<String>,

    /// Skip the interactive confirmation.
    #[arg(long = "yes")]
    pub yes: bool,
}

#[derive(Parser)]
pub struct QueryArgs {
    /// Stored query title, e.g. "All Initiatives".
    #[arg(value_name = "TITLE")]
    pub title: String,
}

#[derive(Parser)]
pub struct ExportArgs {
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Output directory for the CSV file (default: current directory).
    #[arg(long = "out", value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
