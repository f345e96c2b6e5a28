//! # formconfig-core
//!
//! Core types shared by every formconfig crate. This crate has no dependency
//! on the rest of the workspace.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy, field-level and schema-level errors
//! - [`settings`] - Service and client settings with defaults
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

pub use error::{FieldError, FormConfigError, FormConfigResult, SchemaError};
pub use settings::Settings;
