use anyhow::{anyhow, Result};
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Directives for `-v` when RUST_LOG is unset; connection chatter stays at warn
const CATALOG_DEBUG: &str = "debug,hyper::proto::h1=warn,hyper::client::pool=warn,reqwest::connect=warn";

fn default_directives(verbose_level: u8) -> &'static str {
    match verbose_level {
        0 => "info",
        1 => CATALOG_DEBUG,
        _ => "trace",
    }
}

fn level_filter(verbose_level: u8, quiet: bool) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose_level)))
}

/// Rotation prefix for a log path, e.g. "podtrack" for "podtrack.log"
fn rotation_prefix(log_filename: &str) -> &str {
    log_filename
        .rsplit_once('.')
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(log_filename)
}

/// Daily-rotated appender next to `log_path`
fn file_writer(log_path: &Path) -> Result<RollingFileAppender> {
    let log_dir = log_path
        .parent()
        .ok_or_else(|| anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;
    let log_filename = log_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Invalid log filename"))?;

    Ok(RollingFileAppender::new(Rotation::DAILY, log_dir, rotation_prefix(log_filename)))
}

/// Install the global subscriber.
///
/// With `log_file` set (the interactive browser), nothing is written to the
/// terminal. JSON lines are used when RUST_LOG_JSON=true or stdout is piped.
pub fn init_logging_with_file(verbose_level: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let (writer, ansi) = match log_file {
        Some(path) => (BoxMakeWriter::new(file_writer(&path)?), false),
        None => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };

    let registry = Registry::default().with(level_filter(verbose_level, quiet));
    let layer = fmt::layer().with_timer(ChronoUtc::rfc_3339()).with_writer(writer);

    if json {
        registry.with(layer.json()).init();
    } else {
        registry.with(layer.with_ansi(ansi)).init();
    }

    Ok(())
}
