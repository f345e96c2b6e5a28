//! Settings for formconfig services and clients.
//!
//! [`Settings`] holds every tunable with a sensible default, so an empty
//! settings file (or none at all) yields a working development server. See
//! [`settings_loader`](crate::settings_loader) for file and environment loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The complete set of formconfig settings.
///
/// # Examples
///
/// ```
/// use formconfig_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.bind_address(), "127.0.0.1:8000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log filter directive (e.g. "info", "formconfig_server=debug").
    pub log_level: String,

    // ── Server ───────────────────────────────────────────────────────

    /// Interface to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Bearer token required on admin write routes. `None` leaves them open.
    pub admin_token: Option<String>,
    /// Origins allowed by CORS. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,

    // ── Storage ──────────────────────────────────────────────────────

    /// JSON file holding the seed configuration. `None` uses the built-in seed.
    pub seed_path: Option<PathBuf>,
    /// JSON file the configuration document is persisted to. `None` keeps it in memory.
    pub data_path: Option<PathBuf>,

    // ── Client ───────────────────────────────────────────────────────

    /// Base URL of the form configuration API, used by HTTP clients.
    pub api_base_url: String,
    /// Request timeout for HTTP clients, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),

            host: "127.0.0.1".to_string(),
            port: 8000,
            admin_token: None,
            cors_allowed_origins: Vec::new(),

            seed_path: None,
            data_path: None,

            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Returns the `host:port` pair the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
