//! Logging setup over `tracing` and `tracing-subscriber`.
//!
//! Level precedence: `RUST_LOG` when set, otherwise the verbosity flags.
//! Output goes to stderr, or to a file when `--log-file` is given.

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    pub format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            format: LogFormat::default(),
            log_file: None,
            with_ansi: io::stderr().is_terminal(),
        }
    }
}

/// Initialize the global subscriber. Call once at startup.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let filter = build_env_filter(config.level_filter);
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_with_writer(config, filter, Mutex::new(file), false);
        }
        None => {
            init_with_writer(config, filter, io::stderr, config.with_ansi);
        }
    }
    Ok(())
}

fn init_with_writer<W>(config: &LogConfig, filter: EnvFilter, writer: W, ansi: bool)
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(writer).with_target(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .init();
        }
    }
}

/// `RUST_LOG` overrides the flag-derived level; external crates stay at
/// warn to reduce noise.
fn build_env_filter(level_filter: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level_filter.to_string().to_lowercase();
        EnvFilter::new(format!(
            "warn,valdesk_cli={level},valdesk_core={level},valdesk_export={level},\
             valdesk_model={level},valdesk_store={level}"
        ))
    })
}
