//! The `validate` command.
//!
//! Runs the submission rules of one form type over a JSON value map and
//! prints the field errors, one per line. Fails if any field is invalid.

use std::path::PathBuf;

use async_trait::async_trait;
use formconfig_core::{FieldError, FormConfigError, FormConfigResult, Settings};
use formconfig_forms::{unknown_keys, validate_form, FormConfiguration, FormData};

use super::{config_arg, find_form_type, form_type_arg, resolve_configuration};
use crate::command::ManagementCommand;

/// Validates a value map against a form type.
pub struct ValidateCommand;

/// Validates `data` against the named form type of `config`.
pub fn validate_data(
    config: &FormConfiguration,
    form_type: &str,
    data: &FormData,
) -> FormConfigResult<Vec<FieldError>> {
    let form_type = find_form_type(config, form_type)?;
    let extra = unknown_keys(form_type, data);
    if !extra.is_empty() {
        tracing::warn!(keys = ?extra, "keys that are not fields of the form type are ignored");
    }
    Ok(validate_form(form_type, data))
}

#[async_trait]
impl ManagementCommand for ValidateCommand {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn help(&self) -> &'static str {
        "Validate a JSON value map against a form type"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(config_arg()).arg(form_type_arg()).arg(
            clap::Arg::new("data")
                .long("data")
                .short('d')
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON file with the values to validate"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormConfigResult<()> {
        let config = resolve_configuration(matches, settings).await?;
        let name = matches
            .get_one::<String>("form-type")
            .map_or("", String::as_str);
        let path = matches
            .get_one::<PathBuf>("data")
            .ok_or_else(|| FormConfigError::Configuration("--data is required".into()))?;
        let data: FormData = serde_json::from_str(&tokio::fs::read_to_string(path).await?)?;

        let errors = validate_data(&config, name, &data)?;
        if errors.is_empty() {
            println!("All fields are valid.");
            return Ok(());
        }
        for error in &errors {
            println!("{} ({}): {}", error.field, error.code, error.message);
        }
        Err(FormConfigError::FieldValidation(errors))
    }
}
