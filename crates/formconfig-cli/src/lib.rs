//! # formconfig-cli
//!
//! Management commands for formconfig.
//!
//! - [`command`] - the [`ManagementCommand`] trait and [`CommandRegistry`]
//! - [`commands`] - the built-in `runserver`, `check`, `render` and `validate`
//!
//! ## Quick Start
//!
//! ```rust
//! use formconfig_cli::command::CommandRegistry;
//! use formconfig_cli::commands::register_builtin_commands;
//!
//! let mut registry = CommandRegistry::new();
//! register_builtin_commands(&mut registry);
//!
//! let names = registry.list_commands();
//! assert!(names.contains(&"runserver"));
//! assert!(names.contains(&"check"));
//! ```

pub mod command;
pub mod commands;

pub use command::{CommandRegistry, ManagementCommand};
