//! Field renderer dispatch.
//!
//! [`render_control`] maps a field's declared type to a [`Control`]: a
//! description of the input to show, bound to the field's current value and
//! carrying the field's rules as native constraint attributes. A control can
//! be turned into an HTML fragment with [`Control::to_html`].
//!
//! [`apply_change`] is the other half: it applies a user interaction to the
//! value map with the semantics of the field's control.

use std::collections::BTreeMap;
use std::fmt;

use crate::schema::{Field, FieldType, FormType};
use crate::value::{default_value_for, FormData, FormValue};

/// The kind of control a field is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetType {
    /// `<input type="text">`.
    TextInput,
    /// `<input type="email">`.
    EmailInput,
    /// `<input type="tel">`.
    TelInput,
    /// `<input type="number">`.
    NumberInput,
    /// `<textarea>`.
    Textarea,
    /// `<select>` with a leading placeholder option.
    Select,
    /// A set of `<input type="radio">` elements.
    RadioSelect,
    /// A single `<input type="checkbox">`.
    CheckboxInput,
    /// One `<input type="checkbox">` per option.
    CheckboxSelectMultiple,
}

impl WidgetType {
    /// Returns the widget used for a field type, or `None` for unknown types.
    pub fn for_field(field: &Field) -> Option<Self> {
        match field.field_type {
            FieldType::Text => Some(Self::TextInput),
            FieldType::Email => Some(Self::EmailInput),
            FieldType::Tel => Some(Self::TelInput),
            FieldType::Number => Some(Self::NumberInput),
            FieldType::Textarea => Some(Self::Textarea),
            FieldType::Select => Some(Self::Select),
            FieldType::Radio => Some(Self::RadioSelect),
            FieldType::Checkbox if field.options.is_empty() => Some(Self::CheckboxInput),
            FieldType::Checkbox => Some(Self::CheckboxSelectMultiple),
            FieldType::Unknown(_) => None,
        }
    }

    /// The `type` attribute of single-line inputs.
    const fn input_type(self) -> Option<&'static str> {
        match self {
            Self::TextInput => Some("text"),
            Self::EmailInput => Some("email"),
            Self::TelInput => Some("tel"),
            Self::NumberInput => Some("number"),
            Self::Textarea
            | Self::Select
            | Self::RadioSelect
            | Self::CheckboxInput
            | Self::CheckboxSelectMultiple => None,
        }
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TextInput => "TextInput",
            Self::EmailInput => "EmailInput",
            Self::TelInput => "TelInput",
            Self::NumberInput => "NumberInput",
            Self::Textarea => "Textarea",
            Self::Select => "Select",
            Self::RadioSelect => "RadioSelect",
            Self::CheckboxInput => "CheckboxInput",
            Self::CheckboxSelectMultiple => "CheckboxSelectMultiple",
        };
        write!(f, "{name}")
    }
}

/// One entry of a choice control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    /// Display text.
    pub label: String,
    /// Submitted value.
    pub value: String,
    /// Whether the option is currently selected or checked.
    pub selected: bool,
}

/// The control itself, bound to the current value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    /// A single-line input.
    TextInput {
        /// The HTML input type.
        input_type: &'static str,
        /// The bound text.
        value: String,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A multi-line input.
    Textarea {
        /// The bound text.
        value: String,
        /// Placeholder text.
        placeholder: Option<String>,
    },
    /// A dropdown.
    Select {
        /// The bound option value.
        value: String,
        /// The text of the leading empty option.
        placeholder: String,
        /// The declared options.
        options: Vec<ChoiceOption>,
    },
    /// An exclusive radio group.
    RadioSelect {
        /// The declared options.
        options: Vec<ChoiceOption>,
    },
    /// A boolean toggle.
    CheckboxInput {
        /// The bound flag.
        checked: bool,
    },
    /// One toggle per option.
    CheckboxSelectMultiple {
        /// The declared options.
        options: Vec<ChoiceOption>,
    },
}

impl Widget {
    /// Returns the kind of this widget.
    pub fn widget_type(&self) -> WidgetType {
        match self {
            Self::TextInput { input_type, .. } => match *input_type {
                "email" => WidgetType::EmailInput,
                "tel" => WidgetType::TelInput,
                "number" => WidgetType::NumberInput,
                _ => WidgetType::TextInput,
            },
            Self::Textarea { .. } => WidgetType::Textarea,
            Self::Select { .. } => WidgetType::Select,
            Self::RadioSelect { .. } => WidgetType::RadioSelect,
            Self::CheckboxInput { .. } => WidgetType::CheckboxInput,
            Self::CheckboxSelectMultiple { .. } => WidgetType::CheckboxSelectMultiple,
        }
    }
}

/// The declared rules, as native input attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeConstraints {
    /// `required`.
    pub required: bool,
    /// `minlength`.
    pub min_length: Option<usize>,
    /// `maxlength`.
    pub max_length: Option<usize>,
    /// `pattern`.
    pub pattern: Option<String>,
    /// `min`, already formatted.
    pub min: Option<String>,
    /// `max`, already formatted.
    pub max: Option<String>,
}

impl NativeConstraints {
    fn from_field(field: &Field) -> Self {
        let rules = &field.validation;
        let numeric = field.field_type == FieldType::Number;
        Self {
            required: field.required,
            min_length: rules.min_length,
            max_length: rules.max_length,
            pattern: rules.pattern.clone(),
            min: rules.min.filter(|_| numeric).map(|v| v.to_string()),
            max: rules.max.filter(|_| numeric).map(|v| v.to_string()),
        }
    }

    fn apply(&self, attrs: &mut Attrs) {
        if self.required {
            attrs.insert("required", None);
        }
        if let Some(len) = self.min_length {
            attrs.insert("minlength", Some(len.to_string()));
        }
        if let Some(len) = self.max_length {
            attrs.insert("maxlength", Some(len.to_string()));
        }
        if let Some(pattern) = &self.pattern {
            attrs.insert("pattern", Some(pattern.clone()));
        }
        if let Some(min) = &self.min {
            attrs.insert("min", Some(min.clone()));
        }
        if let Some(max) = &self.max {
            attrs.insert("max", Some(max.clone()));
        }
    }
}

/// A rendered field: its label, help text, constraints and bound widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// The field name; also the `name` attribute.
    pub name: String,
    /// The field label.
    pub label: String,
    /// Help text shown under the control.
    pub help_text: Option<String>,
    /// Native constraint attributes.
    pub constraints: NativeConstraints,
    /// The bound widget.
    pub widget: Widget,
}

impl Control {
    /// The `id` of the control's primary element.
    pub fn id_for_label(&self) -> String {
        format!("id_{}", self.name)
    }

    /// Renders the control as an HTML fragment. All text is escaped.
    pub fn to_html(&self) -> String {
        let id = self.id_for_label();
        let label = escape_html(&self.label);
        let mut html = match &self.widget {
            Widget::CheckboxInput { .. }
            | Widget::RadioSelect { .. }
            | Widget::CheckboxSelectMultiple { .. } => String::new(),
            Widget::TextInput { .. } | Widget::Textarea { .. } | Widget::Select { .. } => {
                format!(r#"<label for="{id}">{label}</label>"#)
            }
        };

        html.push_str(&self.render_widget(&id));

        if let Some(help) = &self.help_text {
            html.push_str(&format!(
                r#"<span class="helptext">{}</span>"#,
                escape_html(help)
            ));
        }
        html
    }

    fn base_attrs(&self, id: &str) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("name", Some(self.name.clone()));
        attrs.insert("id", Some(id.to_string()));
        attrs
    }

    fn render_widget(&self, id: &str) -> String {
        match &self.widget {
            Widget::TextInput {
                input_type,
                value,
                placeholder,
            } => {
                let mut attrs = self.base_attrs(id);
                attrs.insert("type", Some((*input_type).to_string()));
                if !value.is_empty() {
                    attrs.insert("value", Some(value.clone()));
                }
                if let Some(p) = placeholder {
                    attrs.insert("placeholder", Some(p.clone()));
                }
                self.constraints.apply(&mut attrs);
                format!("<input{}>", render_attrs(&attrs))
            }
            Widget::Textarea { value, placeholder } => {
                let mut attrs = self.base_attrs(id);
                if let Some(p) = placeholder {
                    attrs.insert("placeholder", Some(p.clone()));
                }
                self.constraints.apply(&mut attrs);
                format!(
                    "<textarea{}>{}</textarea>",
                    render_attrs(&attrs),
                    escape_html(value)
                )
            }
            Widget::Select {
                value,
                placeholder,
                options,
            } => {
                let mut attrs = self.base_attrs(id);
                if self.constraints.required {
                    attrs.insert("required", None);
                }
                let mut html = format!("<select{}>", render_attrs(&attrs));
                let mut empty = Attrs::new();
                empty.insert("value", Some(String::new()));
                if value.is_empty() {
                    empty.insert("selected", None);
                }
                html.push_str(&format!(
                    "<option{}>{}</option>",
                    render_attrs(&empty),
                    escape_html(placeholder)
                ));
                for option in options {
                    let mut attrs = Attrs::new();
                    attrs.insert("value", Some(option.value.clone()));
                    if option.selected {
                        attrs.insert("selected", None);
                    }
                    html.push_str(&format!(
                        "<option{}>{}</option>",
                        render_attrs(&attrs),
                        escape_html(&option.label)
                    ));
                }
                html.push_str("</select>");
                html
            }
            Widget::CheckboxInput { checked } => {
                let mut attrs = self.base_attrs(id);
                attrs.insert("type", Some("checkbox".to_string()));
                if *checked {
                    attrs.insert("checked", None);
                }
                if self.constraints.required {
                    attrs.insert("required", None);
                }
                format!(
                    r#"<label for="{id}"><input{}> {}</label>"#,
                    render_attrs(&attrs),
                    escape_html(&self.label)
                )
            }
            Widget::RadioSelect { options } => {
                self.render_choice_list(id, "radio", options, self.constraints.required)
            }
            Widget::CheckboxSelectMultiple { options } => {
                self.render_choice_list(id, "checkbox", options, false)
            }
        }
    }

    fn render_choice_list(
        &self,
        id: &str,
        input_type: &str,
        options: &[ChoiceOption],
        required: bool,
    ) -> String {
        let mut html = format!(
            r#"<fieldset id="{id}"><legend>{}</legend>"#,
            escape_html(&self.label)
        );
        for (i, option) in options.iter().enumerate() {
            let option_id = format!("{id}_{i}");
            let mut attrs = Attrs::new();
            attrs.insert("type", Some(input_type.to_string()));
            attrs.insert("name", Some(self.name.clone()));
            attrs.insert("id", Some(option_id.clone()));
            attrs.insert("value", Some(option.value.clone()));
            if option.selected {
                attrs.insert("checked", None);
            }
            if required {
                attrs.insert("required", None);
            }
            html.push_str(&format!(
                r#"<label for="{option_id}"><input{}> {}</label>"#,
                render_attrs(&attrs),
                escape_html(&option.label)
            ));
        }
        html.push_str("</fieldset>");
        html
    }
}

/// A user interaction with a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// New text for a text-like, select or radio control.
    Input(String),
    /// Flip a boolean checkbox.
    Toggle,
    /// Check or uncheck one option of a checkbox group.
    ToggleOption(String),
}

/// Renders a field bound to `current`, or to its empty value when `None`.
///
/// Returns `None` for fields of an unknown type.
pub fn render_control(field: &Field, current: Option<&FormValue>) -> Option<Control> {
    let widget_type = WidgetType::for_field(field)?;
    let default = default_value_for(field);
    let value = current.unwrap_or(&default);
    let text = value.as_text().unwrap_or_default().to_string();

    let widget = match widget_type {
        WidgetType::TextInput
        | WidgetType::EmailInput
        | WidgetType::TelInput
        | WidgetType::NumberInput => Widget::TextInput {
            input_type: widget_type.input_type().unwrap_or("text"),
            value: text,
            placeholder: field.placeholder.clone(),
        },
        WidgetType::Textarea => Widget::Textarea {
            value: text,
            placeholder: field.placeholder.clone(),
        },
        WidgetType::Select => Widget::Select {
            options: choice_options(field, |v| v == text),
            placeholder: field
                .placeholder
                .clone()
                .unwrap_or_else(|| format!("Select {}", field.label)),
            value: text,
        },
        WidgetType::RadioSelect => Widget::RadioSelect {
            options: choice_options(field, |v| v == text),
        },
        WidgetType::CheckboxInput => Widget::CheckboxInput {
            checked: value.as_bool().unwrap_or(false),
        },
        WidgetType::CheckboxSelectMultiple => {
            let selected = value.as_choices().unwrap_or_default();
            Widget::CheckboxSelectMultiple {
                options: choice_options(field, |v| selected.iter().any(|s| s == v)),
            }
        }
    };

    Some(Control {
        name: field.name.clone(),
        label: field.label.clone(),
        help_text: field.help_text.clone(),
        constraints: NativeConstraints::from_field(field),
        widget,
    })
}

/// Applies `event` to `data` with the semantics of `field`'s control.
///
/// Returns `false`, leaving `data` untouched, when the event does not apply
/// to the control (a `Toggle` on a text input, an option the field does not
/// declare, any event on an unknown type).
pub fn apply_change(field: &Field, data: &mut FormData, event: ChangeEvent) -> bool {
    let Some(widget_type) = WidgetType::for_field(field) else {
        return false;
    };

    match (widget_type, event) {
        (
            WidgetType::TextInput
            | WidgetType::EmailInput
            | WidgetType::TelInput
            | WidgetType::NumberInput
            | WidgetType::Textarea
            | WidgetType::Select
            | WidgetType::RadioSelect,
            ChangeEvent::Input(text),
        ) => {
            data.insert(field.name.clone(), FormValue::Text(text));
            true
        }
        (WidgetType::CheckboxInput, ChangeEvent::Toggle) => {
            let current = data
                .get(&field.name)
                .and_then(FormValue::as_bool)
                .unwrap_or(false);
            data.insert(field.name.clone(), FormValue::Bool(!current));
            true
        }
        (WidgetType::CheckboxSelectMultiple, ChangeEvent::ToggleOption(value)) => {
            if !field.has_option(&value) {
                return false;
            }
            let mut selected: Vec<String> = data
                .get(&field.name)
                .and_then(FormValue::as_choices)
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            if let Some(pos) = selected.iter().position(|s| *s == value) {
                selected.remove(pos);
            } else {
                selected.push(value);
            }
            let ordered = field
                .options
                .iter()
                .filter(|o| selected.contains(&o.value))
                .map(|o| o.value.clone())
                .collect();
            data.insert(field.name.clone(), FormValue::Choices(ordered));
            true
        }
        _ => false,
    }
}

/// Renders every field of `form_type` in order, bound to `data`.
///
/// Fields of an unknown type are skipped.
pub fn render_form_type(form_type: &FormType, data: &FormData) -> String {
    form_type
        .fields_in_order()
        .into_iter()
        .filter_map(|field| render_control(field, data.get(&field.name)))
        .map(|control| format!(r#"<div class="field">{}</div>"#, control.to_html()))
        .collect::<Vec<_>>()
        .join("\n")
}

fn choice_options(field: &Field, is_selected: impl Fn(&str) -> bool) -> Vec<ChoiceOption> {
    field
        .options
        .iter()
        .map(|o| ChoiceOption {
            label: o.label.clone(),
            value: o.value.clone(),
            selected: is_selected(&o.value),
        })
        .collect()
}

/// Attribute map; `None` renders a bare boolean attribute.
type Attrs = BTreeMap<&'static str, Option<String>>;

/// Renders attributes in name order with escaped values.
fn render_attrs(attrs: &Attrs) -> String {
    attrs
        .iter()
        .map(|(k, v)| match v {
            Some(v) => format!(r#" {k}="{}""#, escape_html(v)),
            None => format!(" {k}"),
        })
        .collect()
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
