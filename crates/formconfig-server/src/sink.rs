//! Destinations for accepted submissions.
//!
//! A [`SubmissionSink`] receives every submission that passed validation.
//! Mailers, CRMs and queues plug in here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use formconfig_core::FormConfigResult;
use formconfig_forms::FormData;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// An accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    /// Unique id assigned on receipt.
    pub id: uuid::Uuid,
    /// The form type's name.
    pub form_type: String,
    /// The validated values, restricted to the form type's fields.
    pub form_data: FormData,
    /// The configuration version the submission was validated against.
    pub schema_version: u64,
    /// When the server accepted it.
    pub received_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Creates a record stamped with a fresh id and the current time.
    pub fn new(form_type: impl Into<String>, form_data: FormData, schema_version: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            form_type: form_type.into(),
            form_data,
            schema_version,
            received_at: Utc::now(),
        }
    }
}

/// Receives accepted submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Takes ownership of an accepted submission.
    async fn accept(&self, record: SubmissionRecord) -> FormConfigResult<()>;
}

/// Keeps every submission in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionSink {
    records: Arc<RwLock<Vec<SubmissionRecord>>>,
}

impl InMemorySubmissionSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every accepted submission, oldest first.
    pub async fn records(&self) -> Vec<SubmissionRecord> {
        self.records.read().await.clone()
    }

    /// Returns the number of accepted submissions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if nothing has been accepted.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SubmissionSink for InMemorySubmissionSink {
    async fn accept(&self, record: SubmissionRecord) -> FormConfigResult<()> {
        self.records.write().await.push(record);
        Ok(())
    }
}

/// Writes every submission to the log and discards it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubmissionSink;

#[async_trait]
impl SubmissionSink for LoggingSubmissionSink {
    async fn accept(&self, record: SubmissionRecord) -> FormConfigResult<()> {
        let payload = serde_json::to_string(&record.form_data)?;
        tracing::info!(
            id = %record.id,
            form_type = %record.form_type,
            schema_version = record.schema_version,
            payload = %payload,
            "submission received"
        );
        Ok(())
    }
}
