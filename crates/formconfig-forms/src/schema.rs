//! The form configuration data model.
//!
//! A [`FormConfiguration`] owns an ordered list of [`FormType`]s, each of which
//! owns an ordered list of [`Field`]s. The `order` value of a form type or field
//! is authoritative; [`FormConfiguration::normalize`] sorts every sibling
//! collection by it and re-numbers it to a contiguous `0..n` range.
//!
//! Everything here serializes to the camelCase JSON used on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The declared type of a field.
///
/// The set is closed: every `match` over it must handle each variant, including
/// [`FieldType::Unknown`], which carries type strings this build does not
/// recognize so that a stored document still loads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text.
    Text,
    /// Single-line email address.
    Email,
    /// Single-line telephone number.
    Tel,
    /// Single-line numeric input.
    Number,
    /// Multi-line text.
    Textarea,
    /// Single choice from a dropdown.
    Select,
    /// Single choice from a radio group.
    Radio,
    /// A boolean toggle, or one toggle per option when options are declared.
    Checkbox,
    /// A type string this build does not recognize.
    Unknown(String),
}

impl FieldType {
    /// Returns the wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Unknown(name) => name,
        }
    }

    /// Returns `true` for the scalar input types, which never carry options.
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Text | Self::Email | Self::Tel | Self::Number | Self::Textarea
        )
    }

    /// Returns `true` for types that must declare at least one option.
    pub const fn requires_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "text" => Self::Text,
            "email" => Self::Email,
            "tel" => Self::Tel,
            "number" => Self::Number,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            _ => Self::Unknown(value),
        }
    }
}

impl From<&str> for FieldType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a field's choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display text.
    pub label: String,
    /// Submitted value.
    pub value: String,
}

impl FieldOption {
    /// Creates a new option.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Declarative validation rules attached to a field. All rules are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    /// Minimum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// A regular expression the value must contain a match for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Lower numeric bound (number fields only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper numeric bound (number fields only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValidationRules {
    /// Returns `true` if no rule is set.
    pub const fn is_empty(&self) -> bool {
        self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
    }
}

/// A typed input descriptor within a form type.
///
/// `name` is the key the field's value is stored under in the form data map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Unique (within the form type) form data key.
    pub name: String,
    /// Display label; also used in error messages.
    pub label: String,
    /// The declared type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether an empty value is rejected.
    #[serde(default)]
    pub required: bool,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Help text shown under the control.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    /// 0-based position among its siblings.
    #[serde(default)]
    pub order: u32,
    /// Declared validation rules.
    #[serde(default)]
    pub validation: ValidationRules,
    /// Choice list for select, radio and checkbox-group fields.
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

impl Field {
    /// Creates an optional field with no rules.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        field_type: impl Into<FieldType>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type: field_type.into(),
            required: false,
            placeholder: None,
            help_text: None,
            order: 0,
            validation: ValidationRules::default(),
            options: Vec::new(),
        }
    }

    /// Sets whether this field is required.
    #[must_use]
    pub const fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Sets the minimum length.
    #[must_use]
    pub const fn min_length(mut self, len: usize) -> Self {
        self.validation.min_length = Some(len);
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn max_length(mut self, len: usize) -> Self {
        self.validation.max_length = Some(len);
        self
    }

    /// Sets the pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.validation.pattern = Some(pattern.into());
        self
    }

    /// Sets the lower numeric bound.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.validation.min = Some(min);
        self
    }

    /// Sets the upper numeric bound.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.validation.max = Some(max);
        self
    }

    /// Appends an option.
    #[must_use]
    pub fn option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(FieldOption::new(label, value));
        self
    }

    /// A checkbox with no options: a single boolean toggle.
    pub fn is_boolean(&self) -> bool {
        self.field_type == FieldType::Checkbox && self.options.is_empty()
    }

    /// A checkbox with options: one toggle per option.
    pub fn is_choice_group(&self) -> bool {
        self.field_type == FieldType::Checkbox && !self.options.is_empty()
    }

    /// Returns `true` if `value` is one of the declared option values.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }
}

fn default_true() -> bool {
    true
}

/// One named, orderable form definition (e.g. "residential inquiry").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormType {
    /// Storage id, assigned when the form type is added.
    #[serde(default)]
    pub id: String,
    /// Unique, stable wire key.
    pub name: String,
    /// Display text.
    pub label: String,
    /// Optional description shown above the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inactive form types are hidden from the public renderer.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// 0-based position among its siblings.
    #[serde(default)]
    pub order: u32,
    /// The form's fields.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Message shown after a successful submission.
    #[serde(default)]
    pub success_message: String,
}

impl FormType {
    /// Creates an active form type with no fields.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            label: label.into(),
            description: None,
            is_active: true,
            order: 0,
            fields: Vec::new(),
            success_message: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Sets the success message.
    #[must_use]
    pub fn success_message(mut self, text: impl Into<String>) -> Self {
        self.success_message = text.into();
        self
    }

    /// Sets whether the form type is active.
    #[must_use]
    pub const fn active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Appends a field at the end of the field list.
    #[must_use]
    pub fn field(mut self, mut field: Field) -> Self {
        field.order = order_for(self.fields.len());
        self.fields.push(field);
        self
    }

    /// Looks up a field by name.
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the fields sorted by `order`.
    pub fn fields_in_order(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.order);
        fields
    }

    /// Sorts fields by `order` and re-numbers them `0..n`.
    pub fn normalize_fields(&mut self) {
        self.fields.sort_by_key(|f| f.order);
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.order = order_for(i);
        }
    }
}

/// The root aggregate: every form type plus global display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfiguration {
    /// Singleton id.
    #[serde(default)]
    pub id: String,
    /// Bumped on every successful write.
    #[serde(default)]
    pub version: u64,
    /// Global form heading.
    #[serde(default)]
    pub form_name: String,
    /// Global form description.
    #[serde(default)]
    pub form_description: String,
    /// The form types.
    #[serde(default)]
    pub form_types: Vec<FormType>,
}

impl FormConfiguration {
    /// Creates an empty configuration with a fresh id.
    pub fn new(form_name: impl Into<String>, form_description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            version: 0,
            form_name: form_name.into(),
            form_description: form_description.into(),
            form_types: Vec::new(),
        }
    }

    /// Looks up a form type by its storage id.
    pub fn form_type(&self, id: &str) -> Option<&FormType> {
        self.form_types.iter().find(|t| t.id == id)
    }

    /// Looks up a form type by its storage id, mutably.
    pub fn form_type_mut(&mut self, id: &str) -> Option<&mut FormType> {
        self.form_types.iter_mut().find(|t| t.id == id)
    }

    /// Looks up a form type by its wire name.
    pub fn form_type_by_name(&self, name: &str) -> Option<&FormType> {
        self.form_types.iter().find(|t| t.name == name)
    }

    /// Returns the active form types sorted by `order`.
    pub fn active_form_types(&self) -> Vec<&FormType> {
        let mut types: Vec<&FormType> = self.form_types.iter().filter(|t| t.is_active).collect();
        types.sort_by_key(|t| t.order);
        types
    }

    /// Returns a copy holding only the active form types, as served to the
    /// public renderer.
    #[must_use]
    pub fn public_view(&self) -> Self {
        let mut view = self.clone();
        view.form_types.retain(|t| t.is_active);
        view.normalize_order_only();
        view
    }

    /// Sorts every sibling collection by `order` and re-numbers it `0..n`.
    ///
    /// The configuration and its form types get ids if they are missing one.
    pub fn normalize(&mut self) {
        if self.id.is_empty() {
            self.id = uuid::Uuid::new_v4().to_string();
        }
        self.normalize_order_only();
        for form_type in &mut self.form_types {
            if form_type.id.is_empty() {
                form_type.id = uuid::Uuid::new_v4().to_string();
            }
            form_type.normalize_fields();
        }
    }

    fn normalize_order_only(&mut self) {
        self.form_types.sort_by_key(|t| t.order);
        for (i, form_type) in self.form_types.iter_mut().enumerate() {
            form_type.order = order_for(i);
        }
    }
}

/// Converts a sibling index to an `order` value, saturating at `u32::MAX`.
pub fn order_for(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_for_saturates() {
        assert_eq!(order_for(0), 0);
        assert_eq!(order_for(7), 7);
        assert_eq!(order_for(usize::MAX), u32::MAX);
    }

    #[test]
    fn test_field_type_wire_names() {
        for name in [
            "text", "email", "tel", "number", "textarea", "select", "radio", "checkbox",
        ] {
            let t = FieldType::from(name);
            assert!(!matches!(t, FieldType::Unknown(_)), "{name} should be known");
            assert_eq!(t.as_str(), name);
        }
    }

    #[test]
    fn test_field_type_unknown_is_preserved() {
        let field: Field =
            serde_json::from_str(r#"{"name":"sig","label":"Signature","type":"signature"}"#)
                .unwrap();
        assert_eq!(field.field_type, FieldType::Unknown("signature".into()));
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "signature");
    }

    #[test]
    fn test_field_deserialize_defaults() {
        let field: Field =
            serde_json::from_str(r#"{"name":"email","label":"Email","type":"email"}"#).unwrap();
        assert!(!field.required);
        assert_eq!(field.order, 0);
        assert!(field.validation.is_empty());
        assert!(field.options.is_empty());
    }

    #[test]
    fn test_field_camel_case_wire() {
        let field = Field::new("phone", "Phone", FieldType::Tel)
            .required(true)
            .help_text("Ten digits")
            .min_length(10)
            .max_length(10);
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["helpText"], "Ten digits");
        assert_eq!(json["validation"]["minLength"], 10);
        assert_eq!(json["validation"]["maxLength"], 10);
        assert!(json["validation"].get("pattern").is_none());
        assert!(json.get("placeholder").is_none());
    }

    #[test]
    fn test_checkbox_shapes() {
        let single = Field::new("agree", "Agree", FieldType::Checkbox);
        assert!(single.is_boolean());
        assert!(!single.is_choice_group());

        let group = Field::new("services", "Services", FieldType::Checkbox)
            .option("Solar", "solar")
            .option("Roofing", "roofing");
        assert!(group.is_choice_group());
        assert!(group.has_option("solar"));
        assert!(!group.has_option("gutters"));
    }

    #[test]
    fn test_form_type_field_appends_in_order() {
        let ft = FormType::new("residential", "Residential")
            .field(Field::new("a", "A", FieldType::Text))
            .field(Field::new("b", "B", FieldType::Text))
            .field(Field::new("c", "C", FieldType::Text));
        let orders: Vec<u32> = ft.fields.iter().map(|f| f.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn test_form_type_is_active_defaults_true() {
        let ft: FormType =
            serde_json::from_str(r#"{"name":"commercial","label":"Commercial"}"#).unwrap();
        assert!(ft.is_active);
        assert!(ft.id.is_empty());
    }

    #[test]
    fn test_normalize_sorts_by_order_and_renumbers() {
        let mut config = FormConfiguration::new("Contact", "");
        let mut b = FormType::new("b", "B");
        b.order = 7;
        let mut a = FormType::new("a", "A");
        a.order = 3;
        let mut f1 = Field::new("x", "X", FieldType::Text);
        f1.order = 5;
        let mut f2 = Field::new("y", "Y", FieldType::Text);
        f2.order = 1;
        a.fields = vec![f1, f2];
        config.form_types = vec![b, a];

        config.normalize();

        let names: Vec<&str> = config.form_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(config.form_types[0].order, 0);
        assert_eq!(config.form_types[1].order, 1);
        let fields: Vec<&str> = config.form_types[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(fields, vec!["y", "x"]);
        assert!(config.form_types.iter().all(|t| !t.id.is_empty()));
    }

    #[test]
    fn test_public_view_hides_inactive() {
        let mut config = FormConfiguration::new("Contact", "");
        config.form_types = vec![
            FormType::new("residential", "Residential"),
            FormType::new("commercial", "Commercial").active(false),
        ];
        config.normalize();

        let view = config.public_view();
        assert_eq!(view.form_types.len(), 1);
        assert_eq!(view.form_types[0].name, "residential");
        assert_eq!(config.form_types.len(), 2);
        assert_eq!(config.active_form_types().len(), 1);
    }
}
