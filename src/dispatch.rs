//! Webhook dispatch: one JSON POST per turn.
//!
//! No retry is attempted. Transport failures, timeouts and non-2xx statuses
//! all surface as [`RelayError`] so the turn can report them to the user.

use crate::error::RelayError;
use crate::payload::OutboundPayload;
use std::time::Duration;
use tracing::{debug, info};

/// HTTP client bound to a single webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
    timeout_secs: Option<u64>,
}

impl WebhookClient {
    /// Build a client for `url`. `timeout_secs = None` means no timeout.
    pub fn new(url: impl Into<String>, timeout_secs: Option<u64>) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("attachment-relay/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout_secs,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST the payload and return the response body as text.
    pub async fn send(&self, payload: &OutboundPayload) -> Result<String, RelayError> {
        info!(
            "Posting turn for session {} with {} file(s)",
            payload.session_id,
            payload.files.len()
        );

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::WebhookStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!("Webhook answered {} with {} bytes", status, body.len());
        Ok(body)
    }

    fn transport_error(&self, e: reqwest::Error) -> RelayError {
        match self.timeout_secs {
            Some(secs) if e.is_timeout() => RelayError::DispatchTimeout {
                url: self.url.clone(),
                secs,
            },
            _ => RelayError::DispatchFailed {
                url: self.url.clone(),
                reason: e.to_string(),
            },
        }
    }
}
