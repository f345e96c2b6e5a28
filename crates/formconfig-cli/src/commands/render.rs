//! The `render` command.
//!
//! Prints the HTML controls of one form type, optionally bound to values read
//! from a JSON file.

use std::path::PathBuf;

use async_trait::async_trait;
use formconfig_core::{FormConfigResult, Settings};
use formconfig_forms::{initialize_form_data, render_form_type, FormConfiguration, FormData};

use super::{config_arg, find_form_type, form_type_arg, resolve_configuration};
use crate::command::ManagementCommand;

/// Renders a form type as HTML.
pub struct RenderCommand;

/// Renders `form_type` from `config`. Values in `data` override the empty
/// defaults.
pub fn render_form(
    config: &FormConfiguration,
    form_type: &str,
    data: Option<FormData>,
) -> FormConfigResult<String> {
    let form_type = find_form_type(config, form_type)?;
    let mut values = initialize_form_data(form_type);
    if let Some(data) = data {
        values.extend(data);
    }
    Ok(render_form_type(form_type, &values))
}

#[async_trait]
impl ManagementCommand for RenderCommand {
    fn name(&self) -> &'static str {
        "render"
    }

    fn help(&self) -> &'static str {
        "Print the HTML controls of a form type"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(config_arg()).arg(form_type_arg()).arg(
            clap::Arg::new("data")
                .long("data")
                .short('d')
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON file with values to bind"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormConfigResult<()> {
        let config = resolve_configuration(matches, settings).await?;
        let name = matches
            .get_one::<String>("form-type")
            .map_or("", String::as_str);
        let data = match matches.get_one::<PathBuf>("data") {
            Some(path) => Some(serde_json::from_str(&tokio::fs::read_to_string(path).await?)?),
            None => None,
        };

        println!("{}", render_form(&config, name, data)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use formconfig_forms::seed::default_configuration;
    use formconfig_forms::FormValue;

    #[test]
    fn test_render_empty_form() {
        let html = render_form(&default_configuration(), "commercial", None).unwrap();
        assert!(html.contains(r#"name="companyName""#));
        assert!(html.contains(r#"type="number""#));
        assert!(!html.contains(r#"name="propertyType""#));
    }

    #[test]
    fn test_render_binds_values() {
        let mut data = FormData::new();
        data.insert("name".into(), FormValue::text("Ada <Lovelace>"));
        let html = render_form(&default_configuration(), "residential", Some(data)).unwrap();
        assert!(html.contains("Ada &lt;Lovelace&gt;"));
    }

    #[test]
    fn test_render_unknown_form_type() {
        let err = render_form(&default_configuration(), "industrial", None).unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
