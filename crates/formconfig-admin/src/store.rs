//! Configuration persistence.
//!
//! [`ConfigStore`] abstracts over where the configuration document lives.
//! Every write is a read-modify-write of the whole document under the
//! store's lock: the mutation runs against a draft copy, and only a
//! successful mutation is committed, with `version` bumped by one.
//!
//! Two implementations are provided: [`InMemoryConfigStore`] for tests and
//! development, and [`FileConfigStore`], which keeps the document in a JSON
//! file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use formconfig_core::{FormConfigError, FormConfigResult};
use formconfig_forms::FormConfiguration;
use tokio::sync::RwLock;

/// An edit applied to a draft of the document.
pub type Mutation<'a> =
    Box<dyn FnOnce(&mut FormConfiguration) -> FormConfigResult<()> + Send + 'a>;

/// Persists the configuration document.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns a snapshot of the current document.
    async fn load(&self) -> FormConfigResult<FormConfiguration>;

    /// Applies `mutation` atomically and returns the committed document.
    ///
    /// If `expected_version` is set and differs from the current version, the
    /// write is rejected with [`FormConfigError::Conflict`]. If the mutation
    /// fails, nothing is written.
    async fn write(
        &self,
        expected_version: Option<u64>,
        mutation: Mutation<'_>,
    ) -> FormConfigResult<FormConfiguration>;
}

/// Runs a typed edit through [`ConfigStore::write`] and returns its result
/// together with the committed document.
///
/// # Examples
///
/// ```
/// use formconfig_admin::editor;
/// use formconfig_admin::store::{apply, InMemoryConfigStore};
/// use formconfig_forms::seed::default_configuration;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryConfigStore::new(default_configuration());
/// let id = store.snapshot().await.form_types[0].id.clone();
/// let (form_type, config) = apply(&store, None, |c| Ok(editor::toggle_active(c, &id)?))
///     .await
///     .unwrap();
/// assert!(!form_type.is_active);
/// assert_eq!(config.version, 1);
/// # });
/// ```
pub async fn apply<S, T, F>(
    store: &S,
    expected_version: Option<u64>,
    edit: F,
) -> FormConfigResult<(T, FormConfiguration)>
where
    S: ConfigStore + ?Sized,
    T: Send,
    F: FnOnce(&mut FormConfiguration) -> FormConfigResult<T> + Send,
{
    let mut output = None;
    let config = store
        .write(
            expected_version,
            Box::new(|draft: &mut FormConfiguration| {
                output = Some(edit(draft)?);
                Ok(())
            }),
        )
        .await?;
    let output = output
        .ok_or_else(|| FormConfigError::Storage("store committed without running the edit".into()))?;
    Ok((output, config))
}

fn check_version(current: u64, expected: Option<u64>) -> FormConfigResult<()> {
    match expected {
        Some(expected) if expected != current => Err(FormConfigError::Conflict(format!(
            "configuration version {expected} is stale; current version is {current}"
        ))),
        _ => Ok(()),
    }
}

/// Runs the mutation against a draft and returns the draft with its version
/// bumped.
fn commit(
    current: &FormConfiguration,
    expected_version: Option<u64>,
    mutation: Mutation<'_>,
) -> FormConfigResult<FormConfiguration> {
    check_version(current.version, expected_version)?;
    let mut draft = current.clone();
    mutation(&mut draft)?;
    draft.normalize();
    draft.id.clone_from(&current.id);
    draft.version = current.version + 1;
    Ok(draft)
}

// ============================================================
// In-memory
// ============================================================

/// In-memory implementation of [`ConfigStore`].
///
/// Thread-safe via `Arc<RwLock<...>>`; clones share the same document.
#[derive(Debug, Clone)]
pub struct InMemoryConfigStore {
    inner: Arc<RwLock<FormConfiguration>>,
}

impl InMemoryConfigStore {
    /// Creates a store holding `config`, normalized.
    pub fn new(mut config: FormConfiguration) -> Self {
        config.normalize();
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Returns the current document directly.
    pub async fn snapshot(&self) -> FormConfiguration {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load(&self) -> FormConfigResult<FormConfiguration> {
        Ok(self.snapshot().await)
    }

    async fn write(
        &self,
        expected_version: Option<u64>,
        mutation: Mutation<'_>,
    ) -> FormConfigResult<FormConfiguration> {
        let mut guard = self.inner.write().await;
        let next = commit(&guard, expected_version, mutation)?;
        *guard = next.clone();
        tracing::debug!(version = next.version, "configuration committed");
        Ok(next)
    }
}

// ============================================================
// JSON file
// ============================================================

/// A [`ConfigStore`] that keeps the document in a JSON file.
///
/// The document is cached in memory; every committed write is flushed to a
/// sibling temporary file and renamed over the original.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
    inner: Arc<RwLock<FormConfiguration>>,
}

impl FileConfigStore {
    /// Opens the store at `path`.
    ///
    /// If the file does not exist it is created from `seed`.
    pub async fn open(
        path: impl Into<PathBuf>,
        seed: impl FnOnce() -> FormConfiguration + Send,
    ) -> FormConfigResult<Self> {
        let path = path.into();
        let config = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let mut config: FormConfiguration = serde_json::from_str(&content)?;
                config.normalize();
                config
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = seed();
                config.normalize();
                persist(&path, &config).await?;
                tracing::info!(path = %path.display(), "seeded configuration file");
                config
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            inner: Arc::new(RwLock::new(config)),
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn persist(path: &Path, config: &FormConfiguration) -> FormConfigResult<()> {
    let json = serde_json::to_vec_pretty(config)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| FormConfigError::Storage(format!("failed to write {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| {
        FormConfigError::Storage(format!("failed to replace {}: {e}", path.display()))
    })?;
    Ok(())
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load(&self) -> FormConfigResult<FormConfiguration> {
        Ok(self.inner.read().await.clone())
    }

    async fn write(
        &self,
        expected_version: Option<u64>,
        mutation: Mutation<'_>,
    ) -> FormConfigResult<FormConfiguration> {
        let mut guard = self.inner.write().await;
        let next = commit(&guard, expected_version, mutation)?;
        persist(&self.path, &next).await?;
        *guard = next.clone();
        tracing::debug!(version = next.version, path = %self.path.display(), "configuration committed");
        Ok(next)
    }
}
