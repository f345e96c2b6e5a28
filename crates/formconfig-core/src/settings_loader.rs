//! Settings loading from configuration files and the environment.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMCONFIG_DEBUG` | `debug` |
//! | `FORMCONFIG_LOG_LEVEL` | `log_level` |
//! | `FORMCONFIG_HOST` | `host` |
//! | `FORMCONFIG_PORT` | `port` |
//! | `FORMCONFIG_ADMIN_TOKEN` | `admin_token` |
//! | `FORMCONFIG_CORS_ALLOWED_ORIGINS` | `cors_allowed_origins` (comma-separated) |
//! | `FORMCONFIG_SEED_PATH` | `seed_path` |
//! | `FORMCONFIG_DATA_PATH` | `data_path` |
//! | `FORMCONFIG_API_BASE_URL` | `api_base_url` |
//! | `FORMCONFIG_REQUEST_TIMEOUT_SECS` | `request_timeout_secs` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formconfig_core::settings_loader;
//!
//! // Picks TOML or JSON from the extension, then applies the environment.
//! let settings = settings_loader::from_file_with_env("formconfig.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::FormConfigError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any key not present in the TOML keeps its default value.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormConfigError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormConfigError::Configuration(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormConfigError::Configuration(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a file, choosing the format from its extension.
///
/// `.json` files are parsed as JSON; everything else as TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn from_file(path: impl AsRef<Path>) -> Result<Settings, FormConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormConfigError::Configuration(format!(
            "Failed to read settings file '{}': {e}",
            path.display()
        ))
    })?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_str(&content)
    } else {
        from_toml_str(&content)
    }
}

/// Loads settings from a file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormConfigError> {
    let mut settings = from_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FORMCONFIG_*` environment variable overrides to a settings struct.
///
/// Unparseable numeric values are ignored and the previous value is kept.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMCONFIG_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FORMCONFIG_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMCONFIG_HOST") {
        settings.host = val;
    }

    if let Ok(val) = std::env::var("FORMCONFIG_PORT") {
        if let Ok(port) = val.parse::<u16>() {
            settings.port = port;
        }
    }

    if let Ok(val) = std::env::var("FORMCONFIG_ADMIN_TOKEN") {
        settings.admin_token = if val.is_empty() { None } else { Some(val) };
    }

    if let Ok(val) = std::env::var("FORMCONFIG_CORS_ALLOWED_ORIGINS") {
        settings.cors_allowed_origins = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    if let Ok(val) = std::env::var("FORMCONFIG_SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(val));
    }

    if let Ok(val) = std::env::var("FORMCONFIG_DATA_PATH") {
        settings.data_path = Some(PathBuf::from(val));
    }

    if let Ok(val) = std::env::var("FORMCONFIG_API_BASE_URL") {
        settings.api_base_url = val;
    }

    if let Ok(val) = std::env::var("FORMCONFIG_REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse::<u64>() {
            settings.request_timeout_secs = secs;
        }
    }
}

// ============================================================
// Helpers
// ============================================================

fn merge_over_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, FormConfigError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormConfigError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;
    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormConfigError::Configuration(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            port = 9000
            admin_token = "s3cret"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.admin_token.as_deref(), Some("s3cret"));
        // Defaults preserved
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_cors_origins() {
        let toml = r#"
            cors_allowed_origins = ["https://example.com", "https://www.example.com"]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.cors_allowed_origins.len(), 2);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(from_toml_str("[[invalid toml content").is_err());
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str(r#"port = "not a port""#);
        assert!(matches!(result, Err(FormConfigError::Configuration(_))));
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "log_level": "debug",
            "seed_path": "config/seed.json"
        }"#;

        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.seed_path, Some(PathBuf::from("config/seed.json")));
        assert_eq!(settings.port, 8000);
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    // ── Files ───────────────────────────────────────────────────────

    #[test]
    fn test_from_file_picks_format_from_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("settings.toml");
        std::fs::write(&toml_path, "port = 8100\n").unwrap();
        assert_eq!(from_file(&toml_path).unwrap().port, 8100);

        let json_path = dir.path().join("settings.json");
        std::fs::write(&json_path, r#"{"port": 8200}"#).unwrap();
        assert_eq!(from_file(&json_path).unwrap().port, 8200);
    }

    #[test]
    fn test_from_file_missing() {
        let result = from_file("/nonexistent/formconfig.toml");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }

    // ── Environment ─────────────────────────────────────────────────

    #[test]
    fn test_apply_env_overrides_log_level() {
        let mut settings = Settings::default();
        std::env::set_var("FORMCONFIG_LOG_LEVEL", "trace");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.log_level, "trace");
        std::env::remove_var("FORMCONFIG_LOG_LEVEL");
    }

    #[test]
    fn test_apply_env_overrides_cors_origins() {
        let mut settings = Settings::default();
        std::env::set_var(
            "FORMCONFIG_CORS_ALLOWED_ORIGINS",
            "https://a.example, , https://b.example",
        );
        apply_env_overrides(&mut settings);
        assert_eq!(
            settings.cors_allowed_origins,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        std::env::remove_var("FORMCONFIG_CORS_ALLOWED_ORIGINS");
    }

    #[test]
    fn test_apply_env_overrides_invalid_timeout_keeps_value() {
        let mut settings = Settings::default();
        std::env::set_var("FORMCONFIG_REQUEST_TIMEOUT_SECS", "soon");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.request_timeout_secs, 30);
        std::env::remove_var("FORMCONFIG_REQUEST_TIMEOUT_SECS");
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}});
        let over = serde_json::json!({"a": {"c": 3}});
        assert_eq!(merge_json(base, over), serde_json::json!({"a": {"b": 1, "c": 3}}));
    }
}
