//! Process exit codes and error display.

use colored::Colorize;
use proxygen_codegen::CodegenError;
use proxygen_core::CoreError;

use crate::error::CliError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 11;
pub const CLASS_NOT_FOUND: i32 = 12;
pub const EXTENSION_NOT_FOUND: i32 = 13;
pub const MISSING_PARAMETER: i32 = 14;

/// Exit code for the first recognized error in the chain.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(err) = cause.downcast_ref::<CoreError>() {
            return match err {
                CoreError::ClassNotFound { .. } => CLASS_NOT_FOUND,
                CoreError::ExtensionNotFound { .. } | CoreError::StubsNotConfigured(_) => {
                    EXTENSION_NOT_FOUND
                }
                _ => FAILURE,
            };
        }
        if let Some(err) = cause.downcast_ref::<CodegenError>() {
            return match err {
                CodegenError::MissingParameter { .. } => MISSING_PARAMETER,
                CodegenError::Io(_) => FAILURE,
            };
        }
        if cause.downcast_ref::<CliError>().is_some() {
            return USAGE;
        }
    }
    FAILURE
}

/// Format an error with its causes for display.
#[must_use]
pub fn format_error(error: &anyhow::Error) -> String {
    let mut message = format!("{} {}", "error:".red().bold(), error);
    for cause in error.chain().skip(1) {
        message.push_str(&format!("\n  {} {}", "caused by:".yellow(), cause));
    }
    message
}

/// Print an error to stderr and return the exit code for it.
#[must_use]
pub fn report(error: &anyhow::Error) -> i32 {
    eprintln!("{}", format_error(error));
    exit_code(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_exit_codes() {
        let not_found = anyhow::Error::new(CoreError::class_not_found("Foo", "a.php"));
        assert_eq!(exit_code(&not_found), CLASS_NOT_FOUND);

        let missing_ext = anyhow::Error::new(CoreError::StubsNotConfigured("spl".into()));
        assert_eq!(exit_code(&missing_ext), EXTENSION_NOT_FOUND);

        let missing_param = anyhow::Error::new(CodegenError::missing_parameter("Foo", "__get"));
        assert_eq!(exit_code(&missing_param), MISSING_PARAMETER);

        let usage = anyhow::Error::new(CliError::InvalidVisibility("x".into()));
        assert_eq!(exit_code(&usage), USAGE);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), FAILURE);
    }

    #[test]
    fn test_context_does_not_hide_cause() {
        let io = CoreError::io("a.php", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = Err::<(), _>(io).context("Failed to load PHP sources").unwrap_err();
        assert_eq!(exit_code(&err), FAILURE);

        let formatted = format_error(&err);
        assert!(formatted.contains("Failed to load PHP sources"));
        assert!(formatted.contains("a.php"));
    }
}
