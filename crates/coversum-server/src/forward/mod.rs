//! Outbound forwarding to the external processing webhook
//!
//! The webhook is an opaque collaborator: we hand it the original image
//! bytes as a `multipart/form-data` POST with a single `data` field and
//! interpret nothing beyond the HTTP status. Forwarding is best-effort
//! and never retried; the caller decides what a failure means for the
//! request in flight.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("Webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook rejected the upload with status {0}")]
    Rejected(u16),
}

/// HTTP client wrapper for the processing webhook.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    endpoint: String,
}

impl Forwarder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ForwardError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("coversum-server/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Hand the uploaded image to the external service.
    ///
    /// A client disconnect on the inbound side does not cancel this
    /// call; once started it runs to completion or failure.
    #[tracing::instrument(
        skip(self, content),
        fields(endpoint = %self.endpoint, filename = %filename, bytes = content.len())
    )]
    pub async fn forward(
        &self,
        filename: &str,
        content_type: &str,
        content: Vec<u8>,
    ) -> Result<(), ForwardError> {
        let part = Part::bytes(content)
            .file_name(filename.to_string())
            .mime_str(content_type)?;
        let form = Form::new().part("data", part);

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Webhook refused the forwarded upload");
            return Err(ForwardError::Rejected(status.as_u16()));
        }

        tracing::debug!("Upload forwarded to webhook");
        Ok(())
    }
}
