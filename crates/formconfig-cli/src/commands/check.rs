//! The `check` command.
//!
//! Runs every authoring check over a configuration document and reports the
//! problems. Errors make the command fail; warnings are reported only.

use async_trait::async_trait;
use formconfig_admin::editor::check_configuration;
use formconfig_core::{FormConfigError, FormConfigResult, Settings};
use formconfig_forms::FormConfiguration;

use super::{config_arg, resolve_configuration};
use crate::command::ManagementCommand;

/// Validates a configuration document.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone)]
pub struct CheckMessage {
    pub level: CheckLevel,
    pub msg: String,
    pub hint: Option<String>,
    /// A stable identifier (e.g. "schema.E001").
    pub id: String,
}

/// Severity of a check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// The document is usable but probably not what was intended.
    Warning,
    /// The document would be rejected by the schema editor.
    Error,
}

impl std::fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Runs every check against `config`.
pub fn run_checks(config: &FormConfiguration) -> Vec<CheckMessage> {
    let mut messages: Vec<CheckMessage> = check_configuration(config)
        .into_iter()
        .map(|problem| CheckMessage {
            level: CheckLevel::Error,
            msg: problem.to_string(),
            hint: None,
            id: "schema.E001".to_string(),
        })
        .collect();

    if config.active_form_types().is_empty() {
        messages.push(CheckMessage {
            level: CheckLevel::Warning,
            msg: "No form type is active".to_string(),
            hint: Some("The public form will show the configuration error page".to_string()),
            id: "schema.W001".to_string(),
        });
    }

    for form_type in &config.form_types {
        if form_type.fields.is_empty() {
            messages.push(CheckMessage {
                level: CheckLevel::Warning,
                msg: format!("Form type '{}' has no fields", form_type.name),
                hint: None,
                id: "schema.W002".to_string(),
            });
        }
        if form_type.success_message.trim().is_empty() {
            messages.push(CheckMessage {
                level: CheckLevel::Warning,
                msg: format!("Form type '{}' has no success message", form_type.name),
                hint: Some("Users will see an empty confirmation after submitting".to_string()),
                id: "schema.W003".to_string(),
            });
        }
    }

    messages
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check a form configuration for authoring mistakes"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(config_arg())
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormConfigResult<()> {
        let config = resolve_configuration(matches, settings).await?;
        let messages = run_checks(&config);

        if messages.is_empty() {
            tracing::info!("Configuration check identified no issues");
            return Ok(());
        }

        let errors = messages
            .iter()
            .filter(|m| m.level == CheckLevel::Error)
            .count();
        for msg in &messages {
            let hint_text = msg
                .hint
                .as_ref()
                .map_or(String::new(), |h| format!("\n\tHINT: {h}"));
            tracing::warn!("{} ({}): {}{}", msg.level, msg.id, msg.msg, hint_text);
        }
        tracing::info!(
            "Configuration check identified {} issue(s) ({} error(s))",
            messages.len(),
            errors
        );

        if errors > 0 {
            return Err(FormConfigError::Configuration(format!(
                "Configuration check found {errors} error(s)"
            )));
        }
        Ok(())
    }
}
