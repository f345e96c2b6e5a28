//! # formconfig
//!
//! Dynamic form configuration, rendering and validation.
//!
//! This is the meta-crate that re-exports the workspace crates. Depend on
//! `formconfig` to get everything, or on individual crates for finer-grained
//! control.
//!
//! ```rust
//! use formconfig::prelude::*;
//!
//! let config = formconfig::forms::seed::default_configuration();
//! let residential = config.form_type_by_name("residential").unwrap();
//! let data = initialize_form_data(residential);
//! let errors = validate_form(residential, &data);
//! assert!(errors.iter().any(|e| e.field == "phone" && e.code == "required"));
//! ```

/// Error types, settings and logging.
pub use formconfig_core as core;

/// Schema model, value maps, validation rules and controls.
pub use formconfig_forms as forms;

/// Schema editing and configuration stores.
#[cfg(feature = "admin")]
pub use formconfig_admin as admin;

/// The REST API and application builder.
#[cfg(feature = "server")]
pub use formconfig_server as server;

/// Form sessions and the submission pipeline.
#[cfg(feature = "client")]
pub use formconfig_client as client;

/// Management commands.
#[cfg(feature = "cli")]
pub use formconfig_cli as cli;

/// In-process test client and transport.
#[cfg(feature = "testing")]
pub use formconfig_test as test;

// Third-party re-exports
pub use async_trait;
pub use axum;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use tracing_subscriber;

/// The types most applications need.
pub mod prelude {
    pub use formconfig_core::{FieldError, FormConfigError, FormConfigResult, SchemaError, Settings};
    pub use formconfig_forms::{
        initialize_form_data, validate_field, validate_form, ChangeEvent, Field, FieldType,
        FormConfiguration, FormData, FormType, FormValue, Submission,
    };

    #[cfg(feature = "admin")]
    pub use formconfig_admin::{ConfigStore, FileConfigStore, InMemoryConfigStore};

    #[cfg(feature = "server")]
    pub use formconfig_server::{FormConfigApp, SubmissionSink};

    #[cfg(feature = "client")]
    pub use formconfig_client::{FormApi, FormSession, HttpFormApi, SubmissionPipeline};
}
