//! HTTP client for a remote queue service, using [`reqwest`].
//!
//! Wire contract:
//! - `POST {base}/tasks` with `{module_name, script_name?, parameters}`
//!   returns `201 {"task_id": "..."}`.
//! - `GET {base}/tasks/{id}` returns `200` with a tagged
//!   [`RemoteJobState`] body, or `404` when the id is unknown.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use zeus_core::job::RemoteJobState;

use crate::{JobQueue, QueueError};

/// Response returned by the queue's submit endpoint.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
}

/// HTTP-backed [`JobQueue`] implementation.
pub struct HttpJobQueue {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobQueue {
    /// Create a client for the queue service at `base_url`.
    ///
    /// Every request is bounded by `timeout`; a timed-out call surfaces as
    /// [`QueueError::Unavailable`].
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, QueueError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QueueError::Protocol(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn transport_error(err: reqwest::Error) -> QueueError {
        QueueError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl JobQueue for HttpJobQueue {
    async fn submit(
        &self,
        module_name: &str,
        script_name: Option<&str>,
        parameters: &serde_json::Value,
    ) -> Result<String, QueueError> {
        let body = serde_json::json!({
            "module_name": module_name,
            "script_name": script_name,
            "parameters": parameters,
        });

        let response = self
            .client
            .post(format!("{}/tasks", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::Protocol(format!(
                "submit returned {status}: {body}"
            )));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| QueueError::Protocol(format!("undecodable submit response: {e}")))?;

        tracing::debug!(task_id = %submitted.task_id, module = module_name, "Job submitted to remote queue");
        Ok(submitted.task_id)
    }

    async fn status(&self, external_id: &str) -> Result<Option<RemoteJobState>, QueueError> {
        let response = self
            .client
            .get(format!("{}/tasks/{external_id}", self.base_url))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueueError::Protocol(format!(
                "status returned {status}: {body}"
            )));
        }

        let state: RemoteJobState = response
            .json()
            .await
            .map_err(|e| QueueError::Protocol(format!("undecodable status response: {e}")))?;
        Ok(Some(state))
    }
}
