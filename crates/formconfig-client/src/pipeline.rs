//! The submission pipeline.
//!
//! A [`SubmissionPipeline`] owns the value map of the selected form type and
//! drives one submission at a time through
//!
//! ```text
//! Idle -> Validating -> Invalid -> Idle
//!                    -> Submitting -> Success
//!                                  -> Error -> Idle
//! ```
//!
//! Validation runs through [`formconfig_forms::validate_form`], the same
//! evaluator the server uses, so a form the pipeline accepts is a form the
//! server accepts. A submission that fails validation never reaches the
//! transport.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use formconfig_client::{FormSession, HttpFormApi, SubmissionPipeline, SubmitOutcome};
//! use formconfig_core::Settings;
//! use formconfig_forms::ChangeEvent;
//!
//! # async fn example() -> Result<(), formconfig_core::FormConfigError> {
//! let api = Arc::new(HttpFormApi::from_settings(&Settings::default())?);
//! let session = FormSession::load(api.as_ref()).await?;
//! let mut pipeline = SubmissionPipeline::new(&session, api);
//!
//! pipeline.apply_change("name", ChangeEvent::Input("Ada".into()));
//! match pipeline.submit().await {
//!     SubmitOutcome::Submitted(message) => println!("{message}"),
//!     SubmitOutcome::Invalid(errors) => println!("{} field(s) to fix", errors.len()),
//!     SubmitOutcome::Failed(message) => println!("{message}"),
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

use formconfig_core::{FieldError, FormConfigError, FormConfigResult};
use formconfig_forms::{
    apply_change, initialize_form_data, render_control, render_form_type, validate_form,
    ChangeEvent, Control, FormConfiguration, FormData, FormType, FormValue, Submission,
};

use crate::session::FormSession;
use crate::transport::FormApi;

/// Where a pipeline is in a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Accepting input.
    Idle,
    /// Running the validation rules.
    Validating,
    /// At least one field failed; errors are attached to their fields.
    Invalid,
    /// The submission is in flight.
    Submitting,
    /// The server accepted the submission.
    Success,
    /// The submission could not be delivered or was rejected.
    Error,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Invalid => "invalid",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// One recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The state left.
    pub from: PipelineState,
    /// The state entered.
    pub to: PipelineState,
}

/// The message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// The form type's success message.
    Success(String),
    /// Why the last submission failed.
    Error(String),
}

/// The result of [`SubmissionPipeline::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Fields failed validation, locally or on the server.
    Invalid(Vec<FieldError>),
    /// Accepted; carries the success message.
    Submitted(String),
    /// Not accepted; carries the message shown to the user.
    Failed(String),
}

/// Drives one form type's values through validation and submission.
pub struct SubmissionPipeline {
    api: Arc<dyn FormApi>,
    config: Arc<FormConfiguration>,
    selected: usize,
    data: FormData,
    errors: Vec<FieldError>,
    banner: Option<Banner>,
    state: PipelineState,
    transitions: Vec<Transition>,
}

impl SubmissionPipeline {
    /// Creates a pipeline over the session's first active form type.
    pub fn new(session: &FormSession, api: Arc<dyn FormApi>) -> Self {
        let config = session.shared();
        let data = config
            .form_types
            .first()
            .map(initialize_form_data)
            .unwrap_or_default();
        Self {
            api,
            config,
            selected: 0,
            data,
            errors: Vec::new(),
            banner: None,
            state: PipelineState::Idle,
            transitions: Vec::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The current state.
    pub const fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state change so far, oldest first.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// The selected form type.
    pub fn form_type(&self) -> &FormType {
        &self.config.form_types[self.selected]
    }

    /// The current values of the selected form type.
    pub const fn form_data(&self) -> &FormData {
        &self.data
    }

    /// The current value of one field.
    pub fn value(&self, name: &str) -> Option<&FormValue> {
        self.data.get(name)
    }

    /// Errors from the last submission attempt.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The error shown next to `name`, if any.
    pub fn error_for(&self, name: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == name)
    }

    /// The banner to show, if any.
    pub const fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Switches to another active form type and starts from empty values.
    pub fn select_form_type(&mut self, name: &str) -> FormConfigResult<()> {
        let index = self
            .config
            .form_types
            .iter()
            .position(|t| t.name == name)
            .ok_or_else(|| FormConfigError::NotFound(format!("Form type '{name}' not found")))?;

        self.selected = index;
        self.data = initialize_form_data(&self.config.form_types[index]);
        self.errors.clear();
        self.leave_success();
        self.banner = None;
        tracing::debug!(form_type = %name, "form type selected");
        Ok(())
    }

    /// Replaces a field's value. Returns `false` if the form type has no
    /// such field.
    pub fn set_value(&mut self, name: &str, value: impl Into<FormValue>) -> bool {
        if self.form_type().get_field(name).is_none() {
            return false;
        }
        self.data.insert(name.to_string(), value.into());
        self.after_edit(name);
        true
    }

    /// Applies a control's change event to the value map. Returns `false`
    /// if the field does not exist or the event does not fit its control.
    pub fn apply_change(&mut self, name: &str, event: ChangeEvent) -> bool {
        let config = Arc::clone(&self.config);
        let Some(field) = config.form_types[self.selected].get_field(name) else {
            return false;
        };
        if !apply_change(field, &mut self.data, event) {
            return false;
        }
        self.after_edit(name);
        true
    }

    fn after_edit(&mut self, name: &str) {
        self.errors.retain(|e| e.field != name);
        self.leave_success();
        self.banner = None;
    }

    fn leave_success(&mut self) {
        if self.state == PipelineState::Success {
            self.transition(PipelineState::Idle);
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// The controls of the selected form type, in field order.
    pub fn controls(&self) -> Vec<Control> {
        self.form_type()
            .fields_in_order()
            .into_iter()
            .filter_map(|field| render_control(field, self.data.get(&field.name)))
            .collect()
    }

    /// The selected form type rendered as HTML.
    pub fn render(&self) -> String {
        render_form_type(self.form_type(), &self.data)
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Validates and, if every field passes, submits the current values.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.leave_success();
        self.banner = None;
        self.transition(PipelineState::Validating);

        let errors = validate_form(self.form_type(), &self.data);
        if !errors.is_empty() {
            return self.reject(errors);
        }

        self.transition(PipelineState::Submitting);
        let submission = Submission {
            form_type: self.form_type().name.clone(),
            form_data: self.data.clone(),
            schema_version: Some(self.config.version),
        };

        match self.api.submit(&submission).await {
            Ok(receipt) => {
                self.transition(PipelineState::Success);
                tracing::debug!(server_message = %receipt.message, "submission receipt");
                let message = self.form_type().success_message.clone();
                self.data = initialize_form_data(self.form_type());
                self.errors.clear();
                self.banner = Some(Banner::Success(message.clone()));
                tracing::info!(form_type = %submission.form_type, "submission accepted");
                SubmitOutcome::Submitted(message)
            }
            Err(FormConfigError::FieldValidation(errors)) => {
                tracing::info!(
                    form_type = %submission.form_type,
                    errors = errors.len(),
                    "server rejected submitted values"
                );
                self.reject(errors)
            }
            Err(err) => {
                let message = match err {
                    FormConfigError::SubmissionTransport(message) => message,
                    other => other.to_string(),
                };
                tracing::warn!(form_type = %submission.form_type, error = %message, "submission failed");
                self.transition(PipelineState::Error);
                self.banner = Some(Banner::Error(message.clone()));
                self.transition(PipelineState::Idle);
                SubmitOutcome::Failed(message)
            }
        }
    }

    fn reject(&mut self, errors: Vec<FieldError>) -> SubmitOutcome {
        self.transition(PipelineState::Invalid);
        self.errors.clone_from(&errors);
        self.transition(PipelineState::Idle);
        SubmitOutcome::Invalid(errors)
    }

    fn transition(&mut self, to: PipelineState) {
        let from = self.state;
        tracing::debug!(%from, %to, "pipeline transition");
        self.transitions.push(Transition { from, to });
        self.state = to;
    }
}

impl fmt::Debug for SubmissionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionPipeline")
            .field("form_type", &self.form_type().name)
            .field("state", &self.state)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}
