//! The seam between a form session and the form configuration API.
//!
//! [`FormApi`] is what the session and the submission pipeline talk to.
//! [`HttpFormApi`] implements it over HTTP with `reqwest`; tests swap in
//! in-process or scripted implementations.
//!
//! Both directions use the API's response envelope. [`decode_config_response`]
//! and [`decode_submit_response`] turn a raw status and body into a result,
//! so every implementation reports failures the same way.

use std::time::Duration;

use async_trait::async_trait;
use formconfig_core::{FieldError, FormConfigError, FormConfigResult, Settings};
use formconfig_forms::{FormConfiguration, Submission};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// Path of the public configuration endpoint, relative to the base URL.
pub const CONFIG_PATH: &str = "api/form-config";
/// Path of the submission endpoint, relative to the base URL.
pub const SUBMIT_PATH: &str = "api/form-config/submit";

/// What the server said when it accepted a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// The form type's success message, shown verbatim.
    pub message: String,
}

/// Access to the form configuration API.
#[async_trait]
pub trait FormApi: Send + Sync {
    /// Fetches the public configuration (active form types only).
    ///
    /// Failures are reported as [`FormConfigError::ConfigurationLoad`].
    async fn fetch_config(&self) -> FormConfigResult<FormConfiguration>;

    /// Sends one submission.
    ///
    /// A server-side rule failure is reported as
    /// [`FormConfigError::FieldValidation`]; every other failure as
    /// [`FormConfigError::SubmissionTransport`] carrying the message to show.
    async fn submit(&self, submission: &Submission) -> FormConfigResult<SubmitReceipt>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    message: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

fn parse_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Envelope<T>, serde_json::Error> {
    serde_json::from_slice(body)
}

/// Interprets a response from the configuration endpoint.
pub fn decode_config_response(status: u16, body: &[u8]) -> FormConfigResult<FormConfiguration> {
    let envelope: Envelope<FormConfiguration> = parse_envelope(body).map_err(|e| {
        FormConfigError::ConfigurationLoad(format!("unreadable response (status {status}): {e}"))
    })?;

    match envelope {
        Envelope {
            success: true,
            data: Some(config),
            ..
        } if (200..300).contains(&status) => Ok(config),
        Envelope { message, .. } => Err(FormConfigError::ConfigurationLoad(
            message.unwrap_or_else(|| format!("server responded with status {status}")),
        )),
    }
}

/// Interprets a response from the submission endpoint.
pub fn decode_submit_response(status: u16, body: &[u8]) -> FormConfigResult<SubmitReceipt> {
    let envelope: Envelope<serde_json::Value> = parse_envelope(body).map_err(|_| {
        FormConfigError::SubmissionTransport(format!(
            "The server returned an unexpected response (status {status})."
        ))
    })?;

    if envelope.success && (200..300).contains(&status) {
        return Ok(SubmitReceipt {
            message: envelope.message.unwrap_or_default(),
        });
    }
    if !envelope.errors.is_empty() {
        return Err(FormConfigError::FieldValidation(envelope.errors));
    }
    Err(FormConfigError::SubmissionTransport(
        envelope
            .message
            .unwrap_or_else(|| format!("The server rejected the submission (status {status}).")),
    ))
}

/// A [`FormApi`] that talks to a running server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFormApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFormApi {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> FormConfigResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| {
            FormConfigError::Configuration(format!("invalid API base URL '{base_url}': {e}"))
        })?;
        // Joining relative paths replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FormConfigError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Creates a client from `api_base_url` and `request_timeout_secs`.
    pub fn from_settings(settings: &Settings) -> FormConfigResult<Self> {
        Self::new(
            &settings.api_base_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// Returns the API base URL.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> FormConfigResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FormConfigError::Configuration(format!("invalid endpoint '{path}': {e}")))
    }
}

#[async_trait]
impl FormApi for HttpFormApi {
    async fn fetch_config(&self) -> FormConfigResult<FormConfiguration> {
        let url = self
            .endpoint(CONFIG_PATH)
            .map_err(|e| FormConfigError::ConfigurationLoad(e.to_string()))?;
        tracing::debug!(url = %url, "fetching form configuration");

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            FormConfigError::ConfigurationLoad(format!("could not reach {url}: {e}"))
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            FormConfigError::ConfigurationLoad(format!("could not read response from {url}: {e}"))
        })?;

        decode_config_response(status, &body)
    }

    async fn submit(&self, submission: &Submission) -> FormConfigResult<SubmitReceipt> {
        let url = self
            .endpoint(SUBMIT_PATH)
            .map_err(|e| FormConfigError::SubmissionTransport(e.to_string()))?;
        tracing::debug!(url = %url, form_type = %submission.form_type, "sending submission");

        let response = self
            .client
            .post(url)
            .json(submission)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "submission request failed");
                FormConfigError::SubmissionTransport(
                    "Your submission could not be sent. Please check your connection and try again."
                        .into(),
                )
            })?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| FormConfigError::SubmissionTransport(e.to_string()))?;

        decode_submit_response(status, &body)
    }
}
