//! Schema editing operations.
//!
//! Every operation takes the configuration document by `&mut` and either
//! applies the whole edit or returns a [`SchemaError`] without touching the
//! document. After a successful edit every sibling collection is sorted by
//! `order` and numbered `0..n`.
//!
//! Fields are addressed by their 0-based position within the form type,
//! which equals their `order`.

use std::collections::HashSet;

use formconfig_core::SchemaError;
use formconfig_forms::schema::order_for;
use formconfig_forms::{Field, FieldType, FormConfiguration, FormType};
use regex::Regex;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Direction of a reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Towards index 0.
    Up,
    /// Towards the end.
    Down,
}

/// The body of an "add form type" request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTypeSpec {
    /// Unique wire key.
    #[serde(default)]
    pub name: String,
    /// Display text.
    #[serde(default)]
    pub label: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the new form type is visible to the public renderer.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Message shown after a successful submission.
    #[serde(default)]
    pub success_message: String,
    /// Initial fields, in order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// A partial update of a form type. `name`, `order` and `fields` cannot be
/// changed this way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormTypePatch {
    /// New label.
    #[serde(default)]
    pub label: Option<String>,
    /// New description; an empty string clears it.
    #[serde(default)]
    pub description: Option<String>,
    /// New activation flag.
    #[serde(default)]
    pub is_active: Option<bool>,
    /// New success message.
    #[serde(default)]
    pub success_message: Option<String>,
}

/// A partial update of the global display text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// New form heading.
    #[serde(default)]
    pub form_name: Option<String>,
    /// New form description.
    #[serde(default)]
    pub form_description: Option<String>,
}

// ============================================================
// Form types
// ============================================================

/// Appends a new form type and returns it with its assigned id and order.
pub fn add_form_type(
    config: &mut FormConfiguration,
    spec: FormTypeSpec,
) -> Result<FormType, SchemaError> {
    let name = spec.name.trim().to_string();
    if name.is_empty() {
        return Err(SchemaError::MissingName("Form type"));
    }
    if spec.label.trim().is_empty() {
        return Err(SchemaError::MissingLabel("Form type"));
    }
    if config.form_type_by_name(&name).is_some() {
        return Err(SchemaError::DuplicateName {
            kind: "Form type",
            name,
        });
    }
    check_fields(&spec.fields)?;

    config.normalize();
    let mut form_type = FormType {
        id: uuid::Uuid::new_v4().to_string(),
        name,
        label: spec.label,
        description: spec.description.filter(|d| !d.is_empty()),
        is_active: spec.is_active,
        order: order_for(config.form_types.len()),
        fields: spec.fields,
        success_message: spec.success_message,
    };
    for (i, field) in form_type.fields.iter_mut().enumerate() {
        field.name = field.name.trim().to_string();
        field.order = order_for(i);
    }

    tracing::info!(
        form_type = %form_type.name,
        fields = form_type.fields.len(),
        "form type added"
    );
    config.form_types.push(form_type.clone());
    Ok(form_type)
}

/// Applies a partial update to a form type.
pub fn update_form_type(
    config: &mut FormConfiguration,
    form_type_id: &str,
    patch: FormTypePatch,
) -> Result<FormType, SchemaError> {
    if patch.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err(SchemaError::MissingLabel("Form type"));
    }
    let form_type = find_form_type(config, form_type_id)?;

    if let Some(label) = patch.label {
        form_type.label = label;
    }
    if let Some(description) = patch.description {
        form_type.description = Some(description).filter(|d| !d.is_empty());
    }
    if let Some(active) = patch.is_active {
        form_type.is_active = active;
    }
    if let Some(message) = patch.success_message {
        form_type.success_message = message;
    }

    tracing::info!(form_type = %form_type.name, "form type updated");
    Ok(form_type.clone())
}

/// Removes a form type and re-numbers the remaining ones.
pub fn delete_form_type(
    config: &mut FormConfiguration,
    form_type_id: &str,
) -> Result<FormType, SchemaError> {
    let pos = config
        .form_types
        .iter()
        .position(|t| t.id == form_type_id)
        .ok_or_else(|| SchemaError::FormTypeNotFound(form_type_id.to_string()))?;
    let removed = config.form_types.remove(pos);
    config.normalize();
    tracing::info!(form_type = %removed.name, "form type deleted");
    Ok(removed)
}

/// Flips a form type's `isActive` flag.
pub fn toggle_active(
    config: &mut FormConfiguration,
    form_type_id: &str,
) -> Result<FormType, SchemaError> {
    let form_type = find_form_type(config, form_type_id)?;
    form_type.is_active = !form_type.is_active;
    tracing::info!(
        form_type = %form_type.name,
        active = form_type.is_active,
        "form type toggled"
    );
    Ok(form_type.clone())
}

/// Swaps a form type with its neighbour. Returns `false` at either boundary.
pub fn move_form_type(
    config: &mut FormConfiguration,
    form_type_id: &str,
    direction: MoveDirection,
) -> Result<bool, SchemaError> {
    config.normalize();
    let pos = config
        .form_types
        .iter()
        .position(|t| t.id == form_type_id)
        .ok_or_else(|| SchemaError::FormTypeNotFound(form_type_id.to_string()))?;
    let moved = swap_with_neighbour(&mut config.form_types, pos, direction);
    for (i, form_type) in config.form_types.iter_mut().enumerate() {
        form_type.order = order_for(i);
    }
    Ok(moved)
}

// ============================================================
// Fields
// ============================================================

/// Appends a field to a form type and returns it with its assigned order.
pub fn add_field(
    config: &mut FormConfiguration,
    form_type_id: &str,
    mut field: Field,
) -> Result<Field, SchemaError> {
    check_field(&field)?;
    let form_type = find_form_type(config, form_type_id)?;
    field.name = field.name.trim().to_string();
    if form_type.get_field(&field.name).is_some() {
        return Err(SchemaError::DuplicateName {
            kind: "Field",
            name: field.name,
        });
    }

    form_type.normalize_fields();
    field.order = order_for(form_type.fields.len());
    tracing::info!(
        form_type = %form_type.name,
        field = %field.name,
        field_type = %field.field_type,
        "field added"
    );
    form_type.fields.push(field.clone());
    Ok(field)
}

/// Replaces the field at `index`, keeping its position.
pub fn update_field(
    config: &mut FormConfiguration,
    form_type_id: &str,
    index: usize,
    mut field: Field,
) -> Result<Field, SchemaError> {
    check_field(&field)?;
    let form_type = find_form_type(config, form_type_id)?;
    form_type.normalize_fields();
    check_index(form_type, index)?;

    field.name = field.name.trim().to_string();
    let clash = form_type
        .fields
        .iter()
        .enumerate()
        .any(|(i, f)| i != index && f.name == field.name);
    if clash {
        return Err(SchemaError::DuplicateName {
            kind: "Field",
            name: field.name,
        });
    }

    field.order = order_for(index);
    tracing::info!(form_type = %form_type.name, field = %field.name, "field updated");
    form_type.fields[index] = field.clone();
    Ok(field)
}

/// Swaps the field at `index` with its neighbour. Returns `false` at either
/// boundary.
pub fn move_field(
    config: &mut FormConfiguration,
    form_type_id: &str,
    index: usize,
    direction: MoveDirection,
) -> Result<bool, SchemaError> {
    let form_type = find_form_type(config, form_type_id)?;
    form_type.normalize_fields();
    check_index(form_type, index)?;
    let moved = swap_with_neighbour(&mut form_type.fields, index, direction);
    for (i, field) in form_type.fields.iter_mut().enumerate() {
        field.order = order_for(i);
    }
    Ok(moved)
}

/// Removes the field at `index` and re-numbers the rest.
pub fn delete_field(
    config: &mut FormConfiguration,
    form_type_id: &str,
    index: usize,
) -> Result<Field, SchemaError> {
    let form_type = find_form_type(config, form_type_id)?;
    form_type.normalize_fields();
    check_index(form_type, index)?;
    let removed = form_type.fields.remove(index);
    form_type.normalize_fields();
    tracing::info!(form_type = %form_type.name, field = %removed.name, "field deleted");
    Ok(removed)
}

// ============================================================
// Global settings
// ============================================================

/// Updates the global display text.
pub fn update_settings(config: &mut FormConfiguration, patch: SettingsPatch) {
    if let Some(name) = patch.form_name {
        config.form_name = name;
    }
    if let Some(description) = patch.form_description {
        config.form_description = description;
    }
}

// ============================================================
// Checks
// ============================================================

/// Runs every authoring check over a whole document and returns all
/// problems found.
pub fn check_configuration(config: &FormConfiguration) -> Vec<SchemaError> {
    let mut problems = Vec::new();
    let mut type_names = HashSet::new();

    for form_type in &config.form_types {
        if form_type.name.trim().is_empty() {
            problems.push(SchemaError::MissingName("Form type"));
        } else if !type_names.insert(form_type.name.as_str()) {
            problems.push(SchemaError::DuplicateName {
                kind: "Form type",
                name: form_type.name.clone(),
            });
        }
        if form_type.label.trim().is_empty() {
            problems.push(SchemaError::MissingLabel("Form type"));
        }

        let mut field_names = HashSet::new();
        for field in &form_type.fields {
            if let Err(e) = check_field(field) {
                problems.push(e);
            }
            if !field.name.trim().is_empty() && !field_names.insert(field.name.as_str()) {
                problems.push(SchemaError::DuplicateName {
                    kind: "Field",
                    name: field.name.clone(),
                });
            }
        }
    }
    problems
}

/// Checks a single field definition in isolation.
pub fn check_field(field: &Field) -> Result<(), SchemaError> {
    let name = field.name.trim();
    if name.is_empty() {
        return Err(SchemaError::MissingName("Field"));
    }
    if field.label.trim().is_empty() {
        return Err(SchemaError::MissingLabel("Field"));
    }
    if let FieldType::Unknown(type_name) = &field.field_type {
        return Err(SchemaError::UnknownFieldType {
            field: name.to_string(),
            type_name: type_name.clone(),
        });
    }
    if field.field_type.requires_options() && field.options.is_empty() {
        return Err(SchemaError::MissingOptions(name.to_string()));
    }
    if field.field_type.is_scalar() && !field.options.is_empty() {
        return Err(SchemaError::UnexpectedOptions(name.to_string()));
    }

    let mut values = HashSet::new();
    for option in &field.options {
        if !values.insert(option.value.as_str()) {
            return Err(SchemaError::DuplicateOption {
                field: name.to_string(),
                value: option.value.clone(),
            });
        }
    }

    let rules = &field.validation;
    if let Some(pattern) = &rules.pattern {
        Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            field: name.to_string(),
            reason: e.to_string(),
        })?;
    }
    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length) {
        if min > max {
            return Err(SchemaError::InvertedLengthBounds(name.to_string()));
        }
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max) {
        if min > max {
            return Err(SchemaError::InvertedNumericBounds(name.to_string()));
        }
    }
    Ok(())
}

fn check_fields(fields: &[Field]) -> Result<(), SchemaError> {
    let mut names = HashSet::new();
    for field in fields {
        check_field(field)?;
        if !names.insert(field.name.trim()) {
            return Err(SchemaError::DuplicateName {
                kind: "Field",
                name: field.name.trim().to_string(),
            });
        }
    }
    Ok(())
}

// ============================================================
// Helpers
// ============================================================

fn find_form_type<'a>(
    config: &'a mut FormConfiguration,
    form_type_id: &str,
) -> Result<&'a mut FormType, SchemaError> {
    config
        .form_type_mut(form_type_id)
        .ok_or_else(|| SchemaError::FormTypeNotFound(form_type_id.to_string()))
}

fn check_index(form_type: &FormType, index: usize) -> Result<(), SchemaError> {
    let len = form_type.fields.len();
    if index < len {
        Ok(())
    } else {
        Err(SchemaError::FieldIndexOutOfRange { index, len })
    }
}

fn swap_with_neighbour<T>(items: &mut [T], index: usize, direction: MoveDirection) -> bool {
    let target = match direction {
        MoveDirection::Up => index.checked_sub(1),
        MoveDirection::Down => Some(index + 1).filter(|&t| t < items.len()),
    };
    match target {
        Some(target) => {
            items.swap(index, target);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use formconfig_forms::seed::default_configuration;

    fn config() -> FormConfiguration {
        default_configuration()
    }

    fn residential_id(config: &FormConfiguration) -> String {
        config.form_type_by_name("residential").unwrap().id.clone()
    }

    fn field_names(config: &FormConfiguration, id: &str) -> Vec<String> {
        config
            .form_type(id)
            .unwrap()
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    fn assert_contiguous(config: &FormConfiguration) {
        for (i, form_type) in config.form_types.iter().enumerate() {
            assert_eq!(form_type.order as usize, i, "form type {}", form_type.name);
            for (j, field) in form_type.fields.iter().enumerate() {
                assert_eq!(field.order as usize, j, "field {}", field.name);
            }
        }
    }

    #[test]
    fn test_add_form_type_appends() {
        let mut config = config();
        let spec = FormTypeSpec {
            name: "  industrial ".into(),
            label: "Industrial".into(),
            is_active: true,
            fields: vec![Field::new("site", "Site", FieldType::Text)],
            ..FormTypeSpec::default()
        };
        let added = add_form_type(&mut config, spec).unwrap();
        assert_eq!(added.name, "industrial");
        assert_eq!(added.order, 2);
        assert!(!added.id.is_empty());
        assert_eq!(config.form_types.len(), 3);
        assert_contiguous(&config);
    }

    #[test]
    fn test_add_form_type_rejects_duplicates_and_blanks() {
        let mut config = config();
        let dup = FormTypeSpec {
            name: "residential".into(),
            label: "Again".into(),
            ..FormTypeSpec::default()
        };
        assert!(matches!(
            add_form_type(&mut config, dup),
            Err(SchemaError::DuplicateName { kind: "Form type", .. })
        ));

        let blank = FormTypeSpec {
            name: " ".into(),
            label: "X".into(),
            ..FormTypeSpec::default()
        };
        assert_eq!(
            add_form_type(&mut config, blank),
            Err(SchemaError::MissingName("Form type"))
        );
        assert_eq!(config.form_types.len(), 2);
    }

    #[test]
    fn test_add_form_type_checks_nested_fields() {
        let mut config = config();
        let spec = FormTypeSpec {
            name: "x".into(),
            label: "X".into(),
            fields: vec![
                Field::new("a", "A", FieldType::Text),
                Field::new("a", "A again", FieldType::Text),
            ],
            ..FormTypeSpec::default()
        };
        assert!(matches!(
            add_form_type(&mut config, spec),
            Err(SchemaError::DuplicateName { kind: "Field", .. })
        ));
    }

    #[test]
    fn test_update_form_type_never_renames() {
        let mut config = config();
        let id = residential_id(&config);
        let patch: FormTypePatch = serde_json::from_value(serde_json::json!({
            "name": "renamed",
            "label": "Homes",
            "successMessage": "Done!",
            "description": ""
        }))
        .unwrap();
        let updated = update_form_type(&mut config, &id, patch).unwrap();
        assert_eq!(updated.name, "residential");
        assert_eq!(updated.label, "Homes");
        assert_eq!(updated.success_message, "Done!");
        assert_eq!(updated.description, None);
    }

    #[test]
    fn test_update_form_type_unknown_id() {
        let mut config = config();
        assert_eq!(
            update_form_type(&mut config, "nope", FormTypePatch::default()),
            Err(SchemaError::FormTypeNotFound("nope".into()))
        );
    }

    #[test]
    fn test_delete_form_type_renumbers() {
        let mut config = config();
        let id = residential_id(&config);
        let removed = delete_form_type(&mut config, &id).unwrap();
        assert_eq!(removed.name, "residential");
        assert_eq!(config.form_types.len(), 1);
        assert_eq!(config.form_types[0].order, 0);
    }

    #[test]
    fn test_toggle_active_hides_from_public_view() {
        let mut config = config();
        let id = residential_id(&config);
        assert!(!toggle_active(&mut config, &id).unwrap().is_active);
        assert!(config.public_view().form_type_by_name("residential").is_none());
        assert!(config.form_type(&id).is_some());
        assert!(toggle_active(&mut config, &id).unwrap().is_active);
    }

    #[test]
    fn test_move_form_type() {
        let mut config = config();
        let id = residential_id(&config);
        assert!(!move_form_type(&mut config, &id, MoveDirection::Up).unwrap());
        assert!(move_form_type(&mut config, &id, MoveDirection::Down).unwrap());
        assert_eq!(config.form_types[0].name, "commercial");
        assert_eq!(config.form_types[1].name, "residential");
        assert_contiguous(&config);
    }

    #[test]
    fn test_add_field_appends_and_checks() {
        let mut config = config();
        let id = residential_id(&config);
        let before = config.form_type(&id).unwrap().fields.len();

        let added = add_field(&mut config, &id, Field::new("zip", "Zip", FieldType::Text)).unwrap();
        assert_eq!(added.order as usize, before);

        let dup = add_field(&mut config, &id, Field::new("zip", "Zip2", FieldType::Text));
        assert!(matches!(dup, Err(SchemaError::DuplicateName { kind: "Field", .. })));
        assert_contiguous(&config);
    }

    #[test]
    fn test_move_field_down_then_up_restores() {
        let mut config = config();
        let id = residential_id(&config);
        let original = field_names(&config, &id);

        assert!(move_field(&mut config, &id, 1, MoveDirection::Down).unwrap());
        let moved = field_names(&config, &id);
        assert_eq!(moved[1], original[2]);
        assert_eq!(moved[2], original[1]);
        assert_contiguous(&config);

        assert!(move_field(&mut config, &id, 2, MoveDirection::Up).unwrap());
        assert_eq!(field_names(&config, &id), original);
        assert_contiguous(&config);
    }

    #[test]
    fn test_move_field_boundaries_are_noops() {
        let mut config = config();
        let id = residential_id(&config);
        let original = field_names(&config, &id);
        let last = original.len() - 1;

        assert!(!move_field(&mut config, &id, 0, MoveDirection::Up).unwrap());
        assert!(!move_field(&mut config, &id, last, MoveDirection::Down).unwrap());
        assert_eq!(field_names(&config, &id), original);
        assert_eq!(
            move_field(&mut config, &id, last + 1, MoveDirection::Up),
            Err(SchemaError::FieldIndexOutOfRange {
                index: last + 1,
                len: last + 1
            })
        );
    }

    #[test]
    fn test_update_field_keeps_position() {
        let mut config = config();
        let id = residential_id(&config);
        let replacement = Field::new("fullName", "Your Name", FieldType::Text).required(true);
        let updated = update_field(&mut config, &id, 0, replacement).unwrap();
        assert_eq!(updated.order, 0);
        assert_eq!(field_names(&config, &id)[0], "fullName");

        let clash = update_field(&mut config, &id, 0, Field::new("email", "E", FieldType::Email));
        assert!(matches!(clash, Err(SchemaError::DuplicateName { .. })));

        let same_name = update_field(&mut config, &id, 0, Field::new("fullName", "N", FieldType::Text));
        assert!(same_name.is_ok());
    }

    #[test]
    fn test_delete_field_renumbers() {
        let mut config = config();
        let id = residential_id(&config);
        let before = field_names(&config, &id);
        let removed = delete_field(&mut config, &id, 1).unwrap();
        assert_eq!(removed.name, before[1]);
        assert_eq!(field_names(&config, &id).len(), before.len() - 1);
        assert_contiguous(&config);
    }

    #[test]
    fn test_update_settings() {
        let mut config = config();
        update_settings(
            &mut config,
            SettingsPatch {
                form_name: Some("Contact Us".into()),
                form_description: None,
            },
        );
        assert_eq!(config.form_name, "Contact Us");
        assert!(!config.form_description.is_empty());
    }

    #[test]
    fn test_check_field_rules() {
        let cases = [
            (
                Field::new("sig", "Signature", "signature"),
                "UnknownFieldType",
            ),
            (Field::new("kind", "Kind", FieldType::Select), "MissingOptions"),
            (
                Field::new("name", "Name", FieldType::Text).option("A", "a"),
                "UnexpectedOptions",
            ),
            (
                Field::new("r", "R", FieldType::Radio)
                    .option("A", "a")
                    .option("A again", "a"),
                "DuplicateOption",
            ),
            (
                Field::new("p", "P", FieldType::Text).pattern("(unclosed"),
                "InvalidPattern",
            ),
            (
                Field::new("l", "L", FieldType::Text).min_length(5).max_length(2),
                "InvertedLengthBounds",
            ),
            (
                Field::new("n", "N", FieldType::Number).min(10.0).max(1.0),
                "InvertedNumericBounds",
            ),
            (Field::new("n", " ", FieldType::Text), "MissingLabel"),
        ];
        for (field, expected) in cases {
            let err = check_field(&field).unwrap_err();
            assert!(
                format!("{err:?}").starts_with(expected),
                "{expected}: got {err:?}"
            );
        }
        let group = Field::new("services", "Services", FieldType::Checkbox).option("A", "a");
        assert!(check_field(&group).is_ok());
    }

    #[test]
    fn test_check_configuration_collects_all() {
        let mut config = config();
        assert!(check_configuration(&config).is_empty());

        config.form_types[0].fields.push(Field::new("name", "Dup", FieldType::Text));
        config.form_types[1]
            .fields
            .push(Field::new("bad", "Bad", FieldType::Select));
        let mut copy = config.form_types[1].clone();
        copy.id = "other".into();
        config.form_types.push(copy);

        let problems = check_configuration(&config);
        assert!(problems.contains(&SchemaError::DuplicateName {
            kind: "Field",
            name: "name".into()
        }));
        assert!(problems.contains(&SchemaError::MissingOptions("bad".into())));
        assert!(problems.contains(&SchemaError::DuplicateName {
            kind: "Form type",
            name: "commercial".into()
        }));
    }
}
