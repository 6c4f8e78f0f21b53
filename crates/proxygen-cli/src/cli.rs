//! Command-line definition and the generation run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use proxygen_codegen::{generate_proxy, write_proxies, CodegenResult, GenerationConfig};
use proxygen_core::{split_list, ClassLoader, CoreResult, StubCatalog, Visibility};

use crate::error::CliError;
use crate::output;

/// Generate PHP proxy classes that delegate to an inner object
#[derive(Parser, Debug)]
#[command(name = "proxygen")]
#[command(author, version, about, long_about = None)]
#[command(
    override_usage = "proxygen [OPTIONS] <files> <classNames> [<innerProperty> <visibilities> <methodBefore> <methodAfter> <ignoreMethods>]"
)]
pub struct Cli {
    /// Comma-separated PHP source files to load (may be empty)
    #[arg(value_name = "files")]
    pub files: String,

    /// Comma-separated class names or ext:<extension> tokens
    #[arg(value_name = "classNames")]
    pub class_names: String,

    /// Property holding the wrapped object; empty disables delegation
    #[arg(value_name = "innerProperty")]
    pub inner_property: Option<String>,

    /// Comma-separated visibilities to proxy [default: public]
    #[arg(value_name = "visibilities")]
    pub visibilities: Option<String>,

    /// Method called with the method name and arguments before delegating
    #[arg(value_name = "methodBefore")]
    pub method_before: Option<String>,

    /// Method called with the method name and arguments after delegating
    #[arg(value_name = "methodAfter")]
    pub method_after: Option<String>,

    /// Comma-separated method names to skip (case-insensitive)
    #[arg(value_name = "ignoreMethods")]
    pub ignore_methods: Option<String>,

    /// Extension stub directory, one sub-directory per extension
    #[arg(long, env = "PROXYGEN_STUBS", value_name = "DIR")]
    pub stubs: Option<PathBuf>,

    /// Print the reflected classes as JSON instead of PHP
    #[arg(long)]
    pub schema: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn execute(&self) -> Result<()> {
        let config = self.generation_config()?;
        debug!(?config, "Generation config");

        let mut loader = ClassLoader::new(self.stubs.clone().map(StubCatalog::new));
        let files: Vec<PathBuf> = split_list(&self.files).into_iter().map(PathBuf::from).collect();
        loader.load_sources(&files).context("Failed to load PHP sources")?;

        let names = loader.resolve_class_names(&split_list(&self.class_names))?;
        let classes = names
            .iter()
            .map(|name| loader.reflect(name))
            .collect::<CoreResult<Vec<_>>>()?;

        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        if self.schema {
            return output::write_schema(&mut out, &classes);
        }

        let proxies = classes
            .iter()
            .map(|class| generate_proxy(class, &config))
            .collect::<CodegenResult<Vec<_>>>()?;
        write_proxies(&mut out, &proxies)?;

        info!(classes = proxies.len(), "Proxies written");
        Ok(())
    }

    /// Build the generation options from the optional positionals. Empty
    /// values count as absent.
    pub fn generation_config(&self) -> Result<GenerationConfig, CliError> {
        let mut config = GenerationConfig::new();

        if let Some(inner) = non_empty(&self.inner_property) {
            config = config.with_inner_property(inner);
        }
        if let Some(labels) = non_empty(&self.visibilities) {
            let labels = split_list(labels);
            if !labels.is_empty() {
                let visibilities = labels
                    .iter()
                    .map(|label| {
                        Visibility::from_label(label).ok_or_else(|| CliError::InvalidVisibility(label.clone()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                config = config.with_visibilities(visibilities);
            }
        }
        if let Some(hook) = non_empty(&self.method_before) {
            config = config.with_method_before(hook);
        }
        if let Some(hook) = non_empty(&self.method_after) {
            config = config.with_method_after(hook);
        }
        if let Some(names) = non_empty(&self.ignore_methods) {
            config = config.with_ignored_methods(split_list(names));
        }

        Ok(config)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("proxygen").chain(args.iter().copied())).expect("parse")
    }

    #[test]
    fn test_requires_two_positionals() {
        assert!(Cli::try_parse_from(["proxygen", "a.php"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["a.php", "Foo"]).generation_config().expect("config");
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn test_empty_positionals_are_absent() {
        let config = parse(&["a.php", "Foo", "", "", "", "", ""])
            .generation_config()
            .expect("config");
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn test_full_configuration() {
        let config = parse(&["", "Foo", "inner", "Public,protected", "before", "after", "__construct,Save"])
            .generation_config()
            .expect("config");
        assert_eq!(config.inner_property.as_deref(), Some("inner"));
        assert!(config.allows(Visibility::Public));
        assert!(config.allows(Visibility::Protected));
        assert!(!config.allows(Visibility::Private));
        assert_eq!(config.method_before.as_deref(), Some("before"));
        assert_eq!(config.method_after.as_deref(), Some("after"));
        assert!(config.is_ignored("save"));
    }

    #[test]
    fn test_invalid_visibility() {
        let err = parse(&["", "Foo", "", "public,internal"])
            .generation_config()
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidVisibility(ref label) if label == "internal"));
    }

    #[test]
    fn test_options() {
        let cli = parse(&["--stubs", "/tmp/stubs", "--schema", "-v", "a.php", "Foo"]);
        assert_eq!(cli.stubs, Some(PathBuf::from("/tmp/stubs")));
        assert!(cli.schema);
        assert!(cli.verbose);
    }
}
