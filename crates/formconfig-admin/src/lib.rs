//! # formconfig-admin
//!
//! Administrative editing of the form configuration. [`editor`] holds the
//! schema editing operations and the authoring-time checks they enforce;
//! [`store`] persists the configuration document and applies each edit as an
//! atomic, versioned read-modify-write.

pub mod editor;
pub mod store;

pub use editor::{FormTypePatch, FormTypeSpec, MoveDirection, SettingsPatch};
pub use store::{apply, ConfigStore, FileConfigStore, InMemoryConfigStore};
