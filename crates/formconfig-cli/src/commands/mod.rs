//! Built-in management commands.
//!
//! Each command implements
//! [`ManagementCommand`](crate::command::ManagementCommand). The helpers here
//! resolve the configuration document a command works on.

pub mod check;
pub mod render;
pub mod runserver;
pub mod validate;

use std::path::{Path, PathBuf};

use formconfig_core::{FormConfigError, FormConfigResult, Settings};
use formconfig_forms::seed::default_configuration;
use formconfig_forms::{FormConfiguration, FormType};

pub use check::CheckCommand;
pub use render::RenderCommand;
pub use runserver::RunserverCommand;
pub use validate::ValidateCommand;

use crate::command::CommandRegistry;

/// Registers all built-in commands into the given registry.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(RunserverCommand));
    registry.register(Box::new(CheckCommand));
    registry.register(Box::new(RenderCommand));
    registry.register(Box::new(ValidateCommand));
}

/// Reads a configuration document from a JSON file and normalizes it.
pub async fn read_configuration(path: &Path) -> FormConfigResult<FormConfiguration> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        FormConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {e}", path.display()),
        ))
    })?;
    let mut config: FormConfiguration = serde_json::from_str(&raw)?;
    config.normalize();
    Ok(config)
}

/// The document a command operates on: `--config` if given, else the
/// settings' seed file, else the built-in seed.
pub async fn resolve_configuration(
    matches: &clap::ArgMatches,
    settings: &Settings,
) -> FormConfigResult<FormConfiguration> {
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        return read_configuration(path).await;
    }
    match &settings.seed_path {
        Some(path) => read_configuration(path).await,
        None => Ok(default_configuration()),
    }
}

/// Looks up a form type by name, active or not.
pub fn find_form_type<'a>(
    config: &'a FormConfiguration,
    name: &str,
) -> FormConfigResult<&'a FormType> {
    config
        .form_type_by_name(name)
        .ok_or_else(|| FormConfigError::NotFound(format!("Form type '{name}' not found")))
}

fn config_arg() -> clap::Arg {
    clap::Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(clap::value_parser!(PathBuf))
        .help("Configuration JSON file (defaults to the seed)")
}

fn form_type_arg() -> clap::Arg {
    clap::Arg::new("form-type")
        .long("form-type")
        .short('f')
        .required(true)
        .help("Name of the form type")
}
