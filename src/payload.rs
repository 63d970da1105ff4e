//! Wire types sent to the webhook, and the per-session context.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// An attachment after normalisation, as it appears in the outbound JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFile {
    pub name: String,
    /// MIME type; always `image/png` once normalised.
    #[serde(rename = "type")]
    pub mime: String,
    pub content_base64: String,
}

/// The JSON body of one webhook request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundPayload {
    pub session_id: Uuid,
    pub text: String,
    pub files: Vec<NormalizedFile>,
}

impl OutboundPayload {
    /// A copy of the payload safe to log: file names and types only.
    pub fn log_summary(&self) -> Value {
        json!({
            "session_id": self.session_id,
            "text": self.text,
            "files": self
                .files
                .iter()
                .map(|f| json!({ "name": f.name, "type": f.mime }))
                .collect::<Vec<_>>(),
        })
    }
}

/// State owned by one chat session.
///
/// Holds only the session identifier, minted once when the session starts
/// and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: Uuid,
}

impl SessionContext {
    /// Start a session with a fresh random identifier.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
        }
    }

    /// Resume a session whose identifier the host already allocated.
    pub fn with_id(session_id: Uuid) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
