//! The `runserver` command.
//!
//! Seeds the configuration store and serves the form API. With `data_path`
//! set the document is persisted to that JSON file; otherwise it lives in
//! memory for the lifetime of the process.

use std::sync::Arc;

use async_trait::async_trait;
use formconfig_admin::editor::check_configuration;
use formconfig_admin::store::{ConfigStore, FileConfigStore, InMemoryConfigStore};
use formconfig_core::{FormConfigError, FormConfigResult, Settings};
use formconfig_forms::seed::default_configuration;
use formconfig_forms::FormConfiguration;
use formconfig_server::FormConfigApp;

use super::read_configuration;
use crate::command::ManagementCommand;

/// Starts the HTTP server.
///
/// `--host` and `--port` override the settings.
pub struct RunserverCommand;

/// Loads the seed document and refuses one the schema editor would reject.
pub async fn load_seed(settings: &Settings) -> FormConfigResult<FormConfiguration> {
    let seed = match &settings.seed_path {
        Some(path) => read_configuration(path).await?,
        None => default_configuration(),
    };
    let problems = check_configuration(&seed);
    if let Some(first) = problems.first() {
        return Err(FormConfigError::Configuration(format!(
            "seed configuration has {} problem(s), first: {first}",
            problems.len()
        )));
    }
    Ok(seed)
}

/// Builds the store selected by the settings.
pub async fn open_store(settings: &Settings) -> FormConfigResult<Arc<dyn ConfigStore>> {
    let seed = load_seed(settings).await?;
    let store: Arc<dyn ConfigStore> = match &settings.data_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using file-backed configuration store");
            Arc::new(FileConfigStore::open(path, move || seed).await?)
        }
        None => Arc::new(InMemoryConfigStore::new(seed)),
    };
    Ok(store)
}

#[async_trait]
impl ManagementCommand for RunserverCommand {
    fn name(&self) -> &'static str {
        "runserver"
    }

    fn help(&self) -> &'static str {
        "Starts the form API server"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            clap::Arg::new("host")
                .long("host")
                .help("Host to bind to (overrides settings)"),
        )
        .arg(
            clap::Arg::new("port")
                .long("port")
                .value_parser(clap::value_parser!(u16))
                .help("Port to bind to (overrides settings)"),
        )
    }

    async fn handle(&self, matches: &clap::ArgMatches, settings: &Settings) -> FormConfigResult<()> {
        let mut settings = settings.clone();
        if let Some(host) = matches.get_one::<String>("host") {
            settings.host.clone_from(host);
        }
        if let Some(port) = matches.get_one::<u16>("port") {
            settings.port = *port;
        }

        let addr = settings.bind_address();
        let store = open_store(&settings).await?;
        FormConfigApp::new(settings).store(store).run(&addr).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_store_by_default() {
        let store = open_store(&Settings::default()).await.unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(config.version, 0);
        assert_eq!(config.form_types.len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_is_created_from_seed() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_path: Some(dir.path().join("config.json")),
            ..Settings::default()
        };
        let store = open_store(&settings).await.unwrap();
        assert_eq!(store.load().await.unwrap().form_types.len(), 2);
        assert!(dir.path().join("config.json").exists());
    }

    #[tokio::test]
    async fn test_broken_seed_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let seed = dir.path().join("seed.json");
        std::fs::write(
            &seed,
            r#"{"formTypes": [{"name": "a", "label": "A", "fields": [
                {"name": "kind", "label": "Kind", "type": "select"}
            ]}]}"#,
        )
        .unwrap();
        let settings = Settings {
            seed_path: Some(seed),
            ..Settings::default()
        };
        let err = load_seed(&settings).await.unwrap_err();
        assert!(matches!(err, FormConfigError::Configuration(_)));
    }
}
