//! Command-line argument errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Unknown visibility '{0}' (expected public, protected or private)")]
    InvalidVisibility(String),
}
