//! # formconfig-forms
//!
//! The form schema and everything that interprets it: the data model
//! ([`schema`]), per-session value maps ([`value`]), the shared rule
//! evaluator ([`validation`]), the type-to-control mapping ([`widgets`]) and
//! the seed configuration ([`seed`]).
//!
//! [`validation`] is the only place validation rules are evaluated. The
//! submission endpoint and the client-side pipeline both call into it.

pub mod schema;
pub mod seed;
pub mod validation;
pub mod value;
pub mod widgets;

pub use schema::{Field, FieldOption, FieldType, FormConfiguration, FormType, ValidationRules};
pub use validation::{unknown_keys, validate_field, validate_form};
pub use value::{initialize_form_data, FormData, FormValue, Submission};
pub use widgets::{
    apply_change, render_control, render_form_type, ChangeEvent, ChoiceOption, Control,
    NativeConstraints, Widget, WidgetType,
};
