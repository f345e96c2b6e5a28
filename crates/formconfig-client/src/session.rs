//! A loaded form configuration.
//!
//! A [`FormSession`] fetches the public configuration once and holds it as an
//! immutable snapshot. Renderers and pipelines created from it all see the
//! same document; a fresh session is the only way to pick up schema edits.

use std::sync::Arc;

use formconfig_core::{FormConfigError, FormConfigResult};
use formconfig_forms::{FormConfiguration, FormType};

use crate::transport::FormApi;

/// An immutable snapshot of the public form configuration.
#[derive(Debug, Clone)]
pub struct FormSession {
    config: Arc<FormConfiguration>,
}

impl FormSession {
    /// Fetches the configuration through `api`.
    ///
    /// Fails with [`FormConfigError::ConfigurationLoad`] if the fetch fails or
    /// the configuration has no active form type.
    pub async fn load(api: &dyn FormApi) -> FormConfigResult<Self> {
        let config = api.fetch_config().await.map_err(|e| match e {
            FormConfigError::ConfigurationLoad(_) => e,
            other => FormConfigError::ConfigurationLoad(other.to_string()),
        })?;
        let session = Self::from_configuration(config)?;
        tracing::info!(
            version = session.version(),
            form_types = session.active_form_types().len(),
            "form configuration loaded"
        );
        Ok(session)
    }

    /// Wraps an already-fetched configuration. Inactive form types are dropped.
    pub fn from_configuration(config: FormConfiguration) -> FormConfigResult<Self> {
        let config = config.public_view();
        if config.form_types.is_empty() {
            return Err(FormConfigError::ConfigurationLoad(
                "no form types are currently available".into(),
            ));
        }
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Returns the configuration snapshot.
    pub fn configuration(&self) -> &FormConfiguration {
        &self.config
    }

    pub(crate) fn shared(&self) -> Arc<FormConfiguration> {
        Arc::clone(&self.config)
    }

    /// Returns the version the snapshot was taken at.
    pub fn version(&self) -> u64 {
        self.config.version
    }

    /// Returns the form types a user can pick from, in display order.
    pub fn active_form_types(&self) -> Vec<&FormType> {
        self.config.active_form_types()
    }

    /// Looks up an active form type by name.
    pub fn form_type(&self, name: &str) -> Option<&FormType> {
        self.config
            .form_type_by_name(name)
            .filter(|t| t.is_active)
    }

    /// The form type selected when a pipeline starts.
    pub fn default_form_type(&self) -> Option<&FormType> {
        self.active_form_types().into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use formconfig_forms::seed::default_configuration;
    use formconfig_forms::Submission;

    use crate::transport::SubmitReceipt;

    struct FixedApi(FormConfigResult<FormConfiguration>);

    #[async_trait]
    impl FormApi for FixedApi {
        async fn fetch_config(&self) -> FormConfigResult<FormConfiguration> {
            match &self.0 {
                Ok(config) => Ok(config.clone()),
                Err(e) => Err(FormConfigError::Storage(e.to_string())),
            }
        }

        async fn submit(&self, _submission: &Submission) -> FormConfigResult<SubmitReceipt> {
            unreachable!("sessions never submit")
        }
    }

    #[tokio::test]
    async fn test_load_exposes_active_types_in_order() {
        let mut config = default_configuration();
        config.form_types.reverse();
        config.form_types[0].order = 1;
        config.form_types[1].order = 0;
        let session = FormSession::load(&FixedApi(Ok(config))).await.unwrap();

        let names: Vec<&str> = session
            .active_form_types()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["residential", "commercial"]);
        assert_eq!(session.default_form_type().unwrap().name, "residential");
    }

    #[tokio::test]
    async fn test_inactive_types_are_dropped() {
        let mut config = default_configuration();
        config.form_types[1].is_active = false;
        let session = FormSession::load(&FixedApi(Ok(config))).await.unwrap();
        assert_eq!(session.active_form_types().len(), 1);
        assert!(session.form_type("commercial").is_none());
        assert!(session.form_type("residential").is_some());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_configuration_load() {
        let api = FixedApi(Err(FormConfigError::Storage("down".into())));
        let err = FormSession::load(&api).await.unwrap_err();
        assert!(matches!(err, FormConfigError::ConfigurationLoad(_)));
    }

    #[tokio::test]
    async fn test_no_active_types_is_configuration_load() {
        let mut config = default_configuration();
        for form_type in &mut config.form_types {
            form_type.is_active = false;
        }
        let err = FormSession::load(&FixedApi(Ok(config))).await.unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
