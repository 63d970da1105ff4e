//! Turn orchestration: gate → normalise → dispatch → render.
//!
//! A [`Relay`] is built once from a [`RelayConfig`] and can serve any number
//! of sessions. Each chat turn goes through [`Relay::handle_message`], which
//! never fails as a whole: every problem is turned into a user-visible reply
//! in the returned [`TurnReport`].

use crate::attachment::Attachment;
use crate::config::RelayConfig;
use crate::dispatch::WebhookClient;
use crate::error::{FileError, RelayError};
use crate::payload::{OutboundPayload, SessionContext};
use crate::pipeline::normalize_all;
use crate::response::render_display;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// One incoming chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    /// Empty message; nothing was processed or sent.
    Rejected,
    /// The webhook answered with a 2xx.
    Delivered,
    /// The webhook could not be reached or answered with an error status.
    DispatchFailed,
}

/// Everything the host needs to show after a turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReport {
    pub status: TurnStatus,
    /// User-visible messages in the order they should be shown.
    pub replies: Vec<String>,
    /// Final names of the files that were sent.
    pub accepted: Vec<String>,
    /// One entry per skipped file.
    pub file_errors: Vec<FileError>,
}

impl TurnReport {
    fn rejected(reason: &RelayError) -> Self {
        Self {
            status: TurnStatus::Rejected,
            replies: vec![reason.to_string()],
            accepted: Vec::new(),
            file_errors: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TurnStatus::Delivered
    }
}

/// Relays chat turns to the configured webhook.
#[derive(Debug, Clone)]
pub struct Relay {
    config: Arc<RelayConfig>,
    client: WebhookClient,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Result<Self, RelayError> {
        let client = WebhookClient::new(config.webhook_url.clone(), config.request_timeout_secs)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Start a session with a freshly minted identifier.
    pub fn start_session(&self) -> SessionContext {
        let session = SessionContext::new();
        info!("Session {} started", session.session_id());
        session
    }

    /// Welcome message for a new session.
    pub fn greeting(&self) -> &str {
        &self.config.greeting
    }

    /// Run one chat turn.
    pub async fn handle_message(
        &self,
        session: &SessionContext,
        message: InboundMessage,
    ) -> TurnReport {
        let report = self.run_turn(session, message).await;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_turn_complete(report.status);
        }
        report
    }

    async fn run_turn(&self, session: &SessionContext, message: InboundMessage) -> TurnReport {
        let InboundMessage { text, attachments } = message;
        let has_files = !attachments.is_empty();
        let has_text = !text.trim().is_empty();

        if !has_files && !has_text {
            info!("Empty message rejected");
            return TurnReport::rejected(&RelayError::EmptyMessage);
        }

        let text = if has_files && !has_text {
            self.config.placeholder_text.clone()
        } else {
            text
        };

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_turn_start(attachments.len());
        }

        let outcome = if has_files {
            normalize_all(attachments, &self.config).await
        } else {
            Default::default()
        };
        let accepted = outcome.accepted_names();
        let mut replies = outcome.error_messages();

        let payload = OutboundPayload {
            session_id: session.session_id(),
            text,
            files: outcome.files,
        };
        info!("Payload being sent: {}", payload.log_summary());

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_dispatch(payload.files.len());
        }

        let status = match self.client.send(&payload).await {
            Ok(body) => {
                replies.push(render_display(&accepted, &body));
                TurnStatus::Delivered
            }
            Err(e) => {
                error!("Dispatch failed: {}", e);
                replies.push(format!("❌ Failed to send data to the webhook: {e}"));
                TurnStatus::DispatchFailed
            }
        };

        TurnReport {
            status,
            replies,
            accepted,
            file_errors: outcome.errors,
        }
    }
}
