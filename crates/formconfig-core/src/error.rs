//! Error types for formconfig.
//!
//! [`FormConfigError`] is the workspace-wide error enum. Each variant maps to
//! an HTTP status code via [`FormConfigError::status_code`]. Two finer-grained
//! types feed into it: [`SchemaError`] for authoring mistakes made through the
//! schema editor, and [`FieldError`] for end-user input that fails a declared
//! validation rule.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single failed validation rule for one field.
///
/// The `message` is the user-facing text; `code` identifies the rule that
/// failed (`required`, `min_length`, `pattern`, ...).
///
/// # Examples
///
/// ```
/// use formconfig_core::error::FieldError;
///
/// let err = FieldError::new("phone", "required", "Phone is required");
/// assert_eq!(err.to_string(), "Phone is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the offending field (its form data key).
    pub field: String,
    /// A short code identifying the failed rule.
    pub code: String,
    /// The message shown next to the field.
    pub message: String,
}

impl FieldError {
    /// Creates a new `FieldError`.
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FieldError {}

/// An invalid form type or field definition supplied by an administrator.
///
/// These are rejected before anything is persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A form type or field was submitted without a name.
    #[error("{0} name is required")]
    MissingName(&'static str),

    /// A form type or field was submitted without a label.
    #[error("{0} label is required")]
    MissingLabel(&'static str),

    /// The name is already used by a sibling.
    #[error("{kind} '{name}' already exists")]
    DuplicateName {
        /// "Form type" or "Field".
        kind: &'static str,
        /// The conflicting name.
        name: String,
    },

    /// The field type string is not one the renderer knows.
    #[error("Field '{field}' has unknown type '{type_name}'")]
    UnknownFieldType {
        /// The field name.
        field: String,
        /// The unrecognized type string.
        type_name: String,
    },

    /// A choice field was declared without options.
    #[error("Field '{0}' requires at least one option")]
    MissingOptions(String),

    /// A scalar field was declared with options.
    #[error("Field '{0}' does not accept options")]
    UnexpectedOptions(String),

    /// Two options of the same field share a value.
    #[error("Field '{field}' has duplicate option value '{value}'")]
    DuplicateOption {
        /// The field name.
        field: String,
        /// The repeated option value.
        value: String,
    },

    /// The validation pattern is not a valid regular expression.
    #[error("Field '{field}' has an invalid pattern: {reason}")]
    InvalidPattern {
        /// The field name.
        field: String,
        /// The regex compiler's complaint.
        reason: String,
    },

    /// `minLength` is greater than `maxLength`.
    #[error("Field '{0}' has minLength greater than maxLength")]
    InvertedLengthBounds(String),

    /// `min` is greater than `max`.
    #[error("Field '{0}' has min greater than max")]
    InvertedNumericBounds(String),

    /// No form type with the given id exists.
    #[error("Form type '{0}' not found")]
    FormTypeNotFound(String),

    /// A field index does not address an existing field.
    #[error("Field index {index} is out of range (form type has {len} fields)")]
    FieldIndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of fields in the form type.
        len: usize,
    },
}

/// The primary error type for formconfig.
///
/// Each variant maps to an HTTP status code via
/// [`FormConfigError::status_code`].
#[derive(Error, Debug)]
pub enum FormConfigError {
    // ── Authoring ────────────────────────────────────────────────────

    /// An administrator submitted an invalid form type or field.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    // ── Submission ───────────────────────────────────────────────────

    /// One or more submitted values failed their declared rules.
    #[error("{} field(s) failed validation", .0.len())]
    FieldValidation(Vec<FieldError>),

    /// The form configuration could not be fetched, or has nothing to render.
    #[error("Configuration load error: {0}")]
    ConfigurationLoad(String),

    /// The submission could not be delivered, or the server rejected it.
    #[error("Submission failed: {0}")]
    SubmissionTransport(String),

    // ── HTTP-ish ─────────────────────────────────────────────────────

    /// The addressed resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The write was based on a stale configuration version.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller is not allowed to perform a write.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A malformed request body or parameter.
    #[error("Bad request: {0}")]
    BadRequest(String),

    // ── Infrastructure ───────────────────────────────────────────────

    /// The configuration store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A settings value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormConfigError {
    /// Returns the HTTP status code associated with this error.
    ///
    /// - `Schema`, `FieldValidation`, `BadRequest`, `Serialization` -> 400
    /// - `Unauthorized` -> 401
    /// - `NotFound` -> 404
    /// - `Conflict` -> 409
    /// - `SubmissionTransport` -> 502
    /// - `ConfigurationLoad` -> 503
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Schema(
                SchemaError::FormTypeNotFound(_) | SchemaError::FieldIndexOutOfRange { .. },
            )
            | Self::NotFound(_) => 404,
            Self::Schema(_)
            | Self::FieldValidation(_)
            | Self::BadRequest(_)
            | Self::Serialization(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Conflict(_) => 409,
            Self::SubmissionTransport(_) => 502,
            Self::ConfigurationLoad(_) => 503,
            Self::Storage(_) | Self::Configuration(_) | Self::Io(_) => 500,
        }
    }

    /// Returns the per-field errors carried by a validation failure.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::FieldValidation(errors) => errors,
            _ => &[],
        }
    }
}

/// A convenience type alias for `Result<T, FormConfigError>`.
pub type FormConfigResult<T> = Result<T, FormConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("email", "required", "Email is required");
        assert_eq!(err.to_string(), "Email is required");
        assert_eq!(err.field, "email");
        assert_eq!(err.code, "required");
    }

    #[test]
    fn test_field_error_serializes_flat() {
        let err = FieldError::new("phone", "min_length", "Phone must be at least 10 characters");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "phone");
        assert_eq!(json["code"], "min_length");
    }

    #[test]
    fn test_schema_error_messages() {
        assert_eq!(
            SchemaError::MissingName("Field").to_string(),
            "Field name is required"
        );
        assert_eq!(
            SchemaError::DuplicateName {
                kind: "Form type",
                name: "residential".into()
            }
            .to_string(),
            "Form type 'residential' already exists"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            FormConfigError::Schema(SchemaError::MissingLabel("Field")).status_code(),
            400
        );
        assert_eq!(
            FormConfigError::Schema(SchemaError::FormTypeNotFound("x".into())).status_code(),
            404
        );
        assert_eq!(FormConfigError::FieldValidation(vec![]).status_code(), 400);
        assert_eq!(FormConfigError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(FormConfigError::NotFound("x".into()).status_code(), 404);
        assert_eq!(FormConfigError::Conflict("x".into()).status_code(), 409);
        assert_eq!(FormConfigError::SubmissionTransport("x".into()).status_code(), 502);
        assert_eq!(FormConfigError::ConfigurationLoad("x".into()).status_code(), 503);
        assert_eq!(FormConfigError::Storage("x".into()).status_code(), 500);
    }

    #[test]
    fn test_field_validation_display_counts() {
        let err = FormConfigError::FieldValidation(vec![
            FieldError::new("a", "required", "A is required"),
            FieldError::new("b", "required", "B is required"),
        ]);
        assert_eq!(err.to_string(), "2 field(s) failed validation");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: FormConfigError = io_err.into();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("file missing"));
    }
}
