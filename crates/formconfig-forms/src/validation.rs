//! The validation engine.
//!
//! [`validate_field`] evaluates a field's declared rules against one value in
//! a fixed order and reports the first failure. [`validate_form`] runs it over
//! every field of a form type and accumulates one error per failing field,
//! so all problems are reported at once.
//!
//! Rule order for a single field:
//!
//! 1. `required`: the value is empty, whitespace-only, `false` or `[]`
//! 2. `minLength` / `maxLength`, counted in characters
//! 3. `pattern`, an unanchored regular-expression search
//! 4. numeric parsing and `min` / `max` for number fields
//! 5. option membership for select, radio and checkbox-group fields
//!
//! Length and pattern rules apply to an empty optional value as well, so
//! `""` fails `minLength`. Numeric and option checks skip it.
//!
//! A value whose shape does not fit the field (a list for a text field, for
//! example) fails with `invalid_type`. Fields of an unknown type are checked
//! for `required` only.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use formconfig_core::FieldError;
use regex::Regex;

use crate::schema::{Field, FieldType, FormType};
use crate::value::{default_value_for, FormData, FormValue};

/// Validates one value against one field's rules.
///
/// Returns `None` when the value is acceptable.
pub fn validate_field(field: &Field, value: &FormValue) -> Option<FieldError> {
    if field.required && value.is_blank() {
        return Some(error(field, "required", format!("{} is required", field.label)));
    }
    if value.is_blank() && value.as_text().is_none() {
        return None;
    }

    match (&field.field_type, value) {
        (FieldType::Unknown(_), _) => None,
        (FieldType::Checkbox, FormValue::Bool(_)) if field.options.is_empty() => None,
        (FieldType::Checkbox, FormValue::Choices(selected)) if !field.options.is_empty() => {
            check_choices(field, selected)
        }
        (FieldType::Checkbox, _) => invalid_type(field),
        (
            FieldType::Text
            | FieldType::Email
            | FieldType::Tel
            | FieldType::Number
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Radio,
            FormValue::Text(text),
        ) => check_text(field, text),
        (
            FieldType::Text
            | FieldType::Email
            | FieldType::Tel
            | FieldType::Number
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Radio,
            FormValue::Bool(_) | FormValue::Choices(_),
        ) => invalid_type(field),
    }
}

/// Validates every field of `form_type` against `data`.
///
/// Fields are visited in `order`. A missing key is validated as the field's
/// empty default. The result holds one entry per failing field.
pub fn validate_form(form_type: &FormType, data: &FormData) -> Vec<FieldError> {
    form_type
        .fields_in_order()
        .into_iter()
        .filter_map(|field| match data.get(&field.name) {
            Some(value) => validate_field(field, value),
            None => validate_field(field, &default_value_for(field)),
        })
        .collect()
}

/// Returns the keys of `data` that are not fields of `form_type`, sorted.
pub fn unknown_keys(form_type: &FormType, data: &FormData) -> Vec<String> {
    let mut keys: Vec<String> = data
        .keys()
        .filter(|key| form_type.get_field(key).is_none())
        .cloned()
        .collect();
    keys.sort();
    keys
}

fn check_text(field: &Field, text: &str) -> Option<FieldError> {
    let rules = &field.validation;
    let len = text.chars().count();

    if let Some(min) = rules.min_length {
        if len < min {
            return Some(error(
                field,
                "min_length",
                format!("{} must be at least {min} characters", field.label),
            ));
        }
    }

    if let Some(max) = rules.max_length {
        if len > max {
            return Some(error(
                field,
                "max_length",
                format!("{} must not exceed {max} characters", field.label),
            ));
        }
    }

    if let Some(pattern) = &rules.pattern {
        if !pattern_matches(field, pattern, text) {
            return Some(error(
                field,
                "pattern",
                format!("{} format is invalid", field.label),
            ));
        }
    }

    if text.trim().is_empty() {
        return None;
    }

    if field.field_type == FieldType::Number {
        if let Some(err) = check_number(field, text) {
            return Some(err);
        }
    }

    if field.field_type.requires_options() && !field.has_option(text) {
        return Some(invalid_choice(field));
    }

    None
}

fn check_number(field: &Field, text: &str) -> Option<FieldError> {
    let number = match text.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            return Some(error(
                field,
                "invalid_number",
                format!("{} must be a number", field.label),
            ))
        }
    };

    if let Some(min) = field.validation.min {
        if number < min {
            return Some(error(
                field,
                "min_value",
                format!("{} must be at least {min}", field.label),
            ));
        }
    }

    if let Some(max) = field.validation.max {
        if number > max {
            return Some(error(
                field,
                "max_value",
                format!("{} must not exceed {max}", field.label),
            ));
        }
    }

    None
}

fn check_choices(field: &Field, selected: &[String]) -> Option<FieldError> {
    selected
        .iter()
        .any(|value| !field.has_option(value))
        .then(|| invalid_choice(field))
}

/// Runs an unanchored search. A pattern that does not compile never matches.
fn pattern_matches(field: &Field, pattern: &str, text: &str) -> bool {
    match compiled(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            tracing::warn!(
                field = %field.name,
                pattern = %pattern,
                error = %e,
                "validation pattern does not compile; rejecting value"
            );
            false
        }
    }
}

/// Returns the compiled form of `pattern`, compiling it on first use.
fn compiled(pattern: &str) -> Result<Regex, regex::Error> {
    static PATTERNS: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();
    let cache = PATTERNS.get_or_init(|| RwLock::new(HashMap::new()));

    if let Some(re) = cache.read().ok().and_then(|map| map.get(pattern).cloned()) {
        return Ok(re);
    }
    let re = Regex::new(pattern)?;
    if let Ok(mut map) = cache.write() {
        map.insert(pattern.to_string(), re.clone());
    }
    Ok(re)
}

fn invalid_choice(field: &Field) -> FieldError {
    error(
        field,
        "invalid_choice",
        format!("{} has an invalid selection", field.label),
    )
}

fn invalid_type(field: &Field) -> Option<FieldError> {
    Some(error(
        field,
        "invalid_type",
        format!("{} has an invalid value", field.label),
    ))
}

fn error(field: &Field, code: &str, message: String) -> FieldError {
    FieldError::new(field.name.clone(), code, message)
}
