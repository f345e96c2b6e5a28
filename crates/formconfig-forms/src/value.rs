//! Per-session form values.
//!
//! A [`FormData`] map holds one [`FormValue`] per field name. Its shape follows
//! the field: text-like fields hold a string, a plain checkbox holds a bool
//! and a checkbox group holds the list of selected option values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::schema::{Field, FieldType, FormType};

/// The value bound to one field.
///
/// On the wire this is untagged: `"text"`, `true` or `["a", "b"]`. JSON
/// numbers are accepted and read as their decimal text, and `null` reads as
/// the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, try_from = "serde_json::Value")]
pub enum FormValue {
    /// A plain checkbox.
    Bool(bool),
    /// Any text-like or single-choice field.
    Text(String),
    /// The selected values of a checkbox group.
    Choices(Vec<String>),
}

impl FormValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns the string, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag, if this is a bool value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the selected values, if this is a choice list.
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(values) => Some(values),
            _ => None,
        }
    }

    /// Returns `true` for `""`, whitespace-only text, `false` and `[]`.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(b) => !b,
            Self::Choices(values) => values.is_empty(),
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FormValue {
    fn from(value: Vec<String>) -> Self {
        Self::Choices(value)
    }
}

impl TryFrom<serde_json::Value> for FormValue {
    type Error = String;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Null => Ok(Self::Text(String::new())),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => Ok(Self::Text(n.to_string())),
            serde_json::Value::String(s) => Ok(Self::Text(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => Ok(s),
                    other => Err(format!("expected a list of strings, found {other}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Choices),
            serde_json::Value::Object(_) => {
                Err("expected a string, boolean or list of strings".to_string())
            }
        }
    }
}

/// A map from field name to its current value.
pub type FormData = HashMap<String, FormValue>;

/// A filled form as sent to the submission endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// The form type's `name`.
    pub form_type: String,
    /// The values, keyed by field name.
    #[serde(default)]
    pub form_data: FormData,
    /// The configuration version the form was rendered from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u64>,
}

/// Returns the empty value for a field's shape.
pub fn default_value_for(field: &Field) -> FormValue {
    match field.field_type {
        FieldType::Checkbox if field.options.is_empty() => FormValue::Bool(false),
        FieldType::Checkbox => FormValue::Choices(Vec::new()),
        FieldType::Text
        | FieldType::Email
        | FieldType::Tel
        | FieldType::Number
        | FieldType::Textarea
        | FieldType::Select
        | FieldType::Radio
        | FieldType::Unknown(_) => FormValue::Text(String::new()),
    }
}

/// Builds a fresh value map holding the empty value of every field.
///
/// # Examples
///
/// ```
/// use formconfig_forms::{initialize_form_data, Field, FieldType, FormType, FormValue};
///
/// let form_type = FormType::new("residential", "Residential")
///     .field(Field::new("name", "Name", FieldType::Text))
///     .field(Field::new("newsletter", "Newsletter", FieldType::Checkbox));
/// let data = initialize_form_data(&form_type);
/// assert_eq!(data["name"], FormValue::text(""));
/// assert_eq!(data["newsletter"], FormValue::Bool(false));
/// ```
pub fn initialize_form_data(form_type: &FormType) -> FormData {
    form_type
        .fields
        .iter()
        .map(|field| (field.name.clone(), default_value_for(field)))
        .collect()
}

/// Drops every key that is not the name of a field of `form_type`.
pub fn retain_known_fields(form_type: &FormType, data: &mut FormData) {
    data.retain(|key, _| form_type.get_field(key).is_some());
}
