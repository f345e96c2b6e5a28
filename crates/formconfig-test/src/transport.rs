//! A [`FormApi`] that calls an in-process router.
//!
//! [`RouterFormApi`] lets a [`FormSession`](formconfig_client::FormSession)
//! and a [`SubmissionPipeline`](formconfig_client::SubmissionPipeline) run
//! against a real server router without a socket. It counts the requests it
//! makes, so tests can assert that a rejected form never reached the server.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use formconfig_client::transport::{
    decode_config_response, decode_submit_response, FormApi, SubmitReceipt, CONFIG_PATH,
    SUBMIT_PATH,
};
use formconfig_core::FormConfigResult;
use formconfig_forms::{FormConfiguration, Submission};

use crate::client::TestClient;

/// A [`FormApi`] backed by a [`TestClient`].
#[derive(Debug)]
pub struct RouterFormApi {
    client: TestClient,
    fetches: AtomicUsize,
    submissions: AtomicUsize,
}

impl RouterFormApi {
    /// Creates a transport over `app`.
    pub const fn new(app: Router) -> Self {
        Self {
            client: TestClient::new(app),
            fetches: AtomicUsize::new(0),
            submissions: AtomicUsize::new(0),
        }
    }

    /// Number of configuration fetches made.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of submissions sent.
    pub fn submit_count(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FormApi for RouterFormApi {
    async fn fetch_config(&self) -> FormConfigResult<FormConfiguration> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let response = self.client.get(&format!("/{CONFIG_PATH}")).await;
        decode_config_response(response.status_code(), &response.body)
    }

    async fn submit(&self, submission: &Submission) -> FormConfigResult<SubmitReceipt> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        let response = self
            .client
            .post_json(&format!("/{SUBMIT_PATH}"), submission)
            .await;
        decode_submit_response(response.status_code(), &response.body)
    }
}
