//! proxygen - PHP proxy class generator
//!
//! Reads PHP sources statically and prints proxy classes that re-declare
//! the selected methods and delegate them to an inner object.

use std::path::Path;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod error;
mod exit;
mod output;

use cli::Cli;

/// Initialize tracing on stderr, plus a log file when one is given.
///
/// Stdout carries the generated code, so nothing is ever logged there.
fn init_tracing(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("proxygen={default_level},proxygen_core={default_level},proxygen_codegen={default_level}")
            .into()
    });

    let file_layer = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .context("Log file path has no file name")?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name)
                .build(dir)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(file_layer)
        .init();
    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit::SUCCESS,
                _ => exit::USAGE,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = init_tracing(cli.log_file.as_deref(), cli.verbose) {
        std::process::exit(exit::report(&err));
    }

    if let Err(err) = cli.execute() {
        std::process::exit(exit::report(&err));
    }
}
