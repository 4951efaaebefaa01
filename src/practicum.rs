use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{body_snippet, PollError};

/// Source of raw homework status responses.
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    /// Fetch every status change since `from_date` (unix seconds).
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError>;
}

#[cfg(test)]
#[async_trait]
impl<T: HomeworkApi + ?Sized> HomeworkApi for std::sync::Arc<T> {
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        (**self).fetch(from_date).await
    }
}

/// Client for the Practicum homework statuses endpoint
pub struct PracticumClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl PracticumClient {
    pub fn new(endpoint: &str, token: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl HomeworkApi for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value, PollError> {
        debug!(
            "Requesting {} with params from_date={}",
            self.endpoint, from_date
        );

        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|source| PollError::Connection {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            let body = response.text().await.unwrap_or_default();
            return Err(PollError::Request {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
                reason,
                body: body_snippet(&body),
            });
        }

        // Dropped connections and timeouts mid-body are transport failures too.
        let body = response
            .bytes()
            .await
            .map_err(|source| PollError::Connection {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        serde_json::from_slice(&body).map_err(|e| PollError::Decode(e.to_string()))
    }
}
