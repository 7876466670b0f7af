//! HTTP implementation of [`BatchTransmitter`].

use std::time::Duration;

use async_trait::async_trait;
use michi_shared::{ClassifiedSample, config::INGEST_PATH};
use reqwest::{StatusCode, header::CONTENT_TYPE};
use thiserror::Error;

use crate::domain::BatchTransmitter;

/// Why a delivery attempt failed
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode batch: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with anything but 200 OK
    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// Posts each batch as one JSON array to `{base_url}/processed_agent_data/`
pub struct HttpBatchTransmitter {
    client: reqwest::Client,
    url: String,
}

impl HttpBatchTransmitter {
    /// Create a transmitter for the store at `base_url` (e.g. `http://127.0.0.1:8000`).
    ///
    /// `timeout` bounds every request, so a hung store cannot stall the producer loop.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", base_url.trim_end_matches('/'), INGEST_PATH),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, payload: String) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl BatchTransmitter for HttpBatchTransmitter {
    async fn send(&self, batch: &[ClassifiedSample]) -> bool {
        // Nothing to deliver: acknowledged without touching the network
        if batch.is_empty() {
            tracing::debug!("Skipping empty batch");
            return true;
        }

        let payload = match serde_json::to_string(batch) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("{}", TransportError::from(e));
                return false;
            }
        };

        match self.post(payload.clone()).await {
            Ok(()) => {
                tracing::debug!("Delivered batch of {} samples to {}", batch.len(), self.url);
                true
            }
            Err(e) => {
                tracing::error!(
                    "Failed to deliver batch to {}\nData: {}\nCause: {}",
                    self.url,
                    payload,
                    e
                );
                false
            }
        }
    }
}
