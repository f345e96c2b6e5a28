//! The application builder.
//!
//! [`FormConfigApp`] combines settings, a configuration store and a
//! submission sink into an axum router with request tracing and CORS, and
//! can run it as an HTTP server.
//!
//! # Examples
//!
//! ```no_run
//! use formconfig_core::Settings;
//! use formconfig_server::FormConfigApp;
//!
//! # async fn example() -> Result<(), formconfig_core::FormConfigError> {
//! let app = FormConfigApp::new(Settings::default());
//! app.run("127.0.0.1:8000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::Router;
use formconfig_admin::store::{ConfigStore, InMemoryConfigStore};
use formconfig_core::{FormConfigError, Settings};
use formconfig_forms::seed::default_configuration;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{api_router, AppState};
use crate::sink::{LoggingSubmissionSink, SubmissionSink};

/// The formconfig HTTP application.
///
/// Defaults to an in-memory store seeded with the built-in configuration
/// and a sink that logs submissions.
pub struct FormConfigApp {
    settings: Settings,
    store: Option<Arc<dyn ConfigStore>>,
    sink: Option<Arc<dyn SubmissionSink>>,
}

impl FormConfigApp {
    /// Creates a new application with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            store: None,
            sink: None,
        }
    }

    /// Sets the configuration store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the submission sink.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn SubmissionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Returns the settings.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Converts the application into an axum router.
    pub fn into_router(self) -> Router {
        let cors = cors_layer(&self.settings.cors_allowed_origins);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryConfigStore::new(default_configuration())));
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(LoggingSubmissionSink));

        let state = Arc::new(AppState {
            store,
            sink,
            admin_token: self.settings.admin_token,
        });

        api_router(state)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the application as an HTTP server on the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the address or
    /// encounters a runtime error.
    pub async fn run(self, addr: &str) -> Result<(), FormConfigError> {
        let debug = self.settings.debug;
        let gated = self.settings.admin_token.is_some();
        let router = self.into_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            FormConfigError::Configuration(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        } else {
            tracing::info!(addr = %addr, "server listening");
        }
        if !gated {
            tracing::warn!("no admin token configured; write routes are open");
        }

        axum::serve(listener, router)
            .await
            .map_err(|e| FormConfigError::Io(std::io::Error::other(format!("Server error: {e}"))))?;

        Ok(())
    }
}

impl std::fmt::Debug for FormConfigApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormConfigApp")
            .field("has_store", &self.store.is_some())
            .field("has_sink", &self.sink.is_some())
            .field("debug", &self.settings.debug)
            .finish()
    }
}

/// An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    use formconfig_test::TestClient;

    #[tokio::test]
    async fn test_default_app_serves_seed() {
        let client = TestClient::new(FormConfigApp::new(Settings::default()).into_router());
        let response = client.get("/api/form-config").await;
        assert_eq!(response.status_code(), 200);
        let json: serde_json::Value = response.json().unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["formTypes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cors_headers_present() {
        let client = TestClient::new(FormConfigApp::new(Settings::default()).into_router());
        let response = client
            .get_with_headers("/health", &[("origin", "https://example.com")])
            .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    }

    #[test]
    fn test_debug_hides_internals() {
        let app = FormConfigApp::new(Settings::default());
        let debug = format!("{app:?}");
        assert!(debug.contains("has_store: false"));
    }
}
