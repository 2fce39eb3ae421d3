//! HTTP implementation of the remote service client.

use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteApi;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP remote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote service (overridable so tests can point at
    /// a mock server).
    pub base_url: String,
    /// Bearer token attached to every request when non-empty.
    pub bearer_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.studypath.app/v1".to_string(),
            bearer_token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Remote service client over HTTP.
pub struct HttpRemote {
    config: RemoteConfig,
    client: Client,
}

impl HttpRemote {
    /// Creates a new HTTP remote client.
    #[must_use]
    pub fn new(config: RemoteConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(&self, req: RequestBuilder) -> SyncResult<()> {
        let req = if self.config.bearer_token.is_empty() {
            req
        } else {
            req.bearer_auth(&self.config.bearer_token)
        };
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp.text().await.unwrap_or_default();
        Err(SyncError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl RemoteApi for HttpRemote {
    async fn ping(&self) -> SyncResult<()> {
        debug!("probing remote status endpoint");
        self.send(self.client.head(self.url("/status"))).await
    }

    async fn update_profile(&self, payload: &Value) -> SyncResult<()> {
        self.send(self.client.put(self.url("/profile")).json(payload))
            .await
    }

    async fn create_schedule_item(&self, payload: &Value) -> SyncResult<()> {
        self.send(self.client.post(self.url("/schedule/items")).json(payload))
            .await
    }

    async fn create_schedule_items(&self, payload: &Value) -> SyncResult<()> {
        self.send(
            self.client
                .post(self.url("/schedule/items/batch"))
                .json(payload),
        )
        .await
    }

    async fn delete_schedule_item(&self, id: &str) -> SyncResult<()> {
        self.send(self.client.delete(self.url(&format!("/schedule/items/{id}"))))
            .await
    }

    async fn delete_schedule_items(&self, ids: &Value) -> SyncResult<()> {
        self.send(
            self.client
                .post(self.url("/schedule/items/batch-delete"))
                .json(ids),
        )
        .await
    }

    async fn move_schedule_items(&self, payload: &Value) -> SyncResult<()> {
        self.send(
            self.client
                .post(self.url("/schedule/items/batch-move"))
                .json(payload),
        )
        .await
    }

    async fn clear_schedule(&self) -> SyncResult<()> {
        self.send(self.client.delete(self.url("/schedule/items")))
            .await
    }

    async fn create_exam(&self, payload: &Value) -> SyncResult<()> {
        self.send(self.client.post(self.url("/exams")).json(payload))
            .await
    }

    async fn update_exam(&self, payload: &Value) -> SyncResult<()> {
        self.send(self.client.put(self.url("/exams")).json(payload))
            .await
    }

    async fn delete_exam(&self, id: &str) -> SyncResult<()> {
        self.send(self.client.delete(self.url(&format!("/exams/{id}"))))
            .await
    }

    async fn update_result(&self, payload: &Value) -> SyncResult<()> {
        self.send(self.client.put(self.url("/results")).json(payload))
            .await
    }

    async fn delete_result(&self, id: &str) -> SyncResult<()> {
        self.send(self.client.delete(self.url(&format!("/results/{id}"))))
            .await
    }

    async fn create_study_session(&self, payload: &Value) -> SyncResult<()> {
        self.send(self.client.post(self.url("/sessions")).json(payload))
            .await
    }
}
