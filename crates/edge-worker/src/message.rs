//! Control messages posted by the page.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::HostError;

/// A message the worker understands, keyed by its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Activate immediately.
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
    /// Reply with the static generation tag.
    #[serde(rename = "GET_VERSION")]
    GetVersion,
    /// Any other `type`. Ignored.
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// Interpret a posted value. `None` when it is not a typed message.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(data.clone()).ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkipWaiting => "SKIP_WAITING",
            Self::GetVersion => "GET_VERSION",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Reply to `GET_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionReply {
    pub version: String,
}

/// The port a reply is posted on.
pub trait MessagePort: Send + Sync {
    fn post_message(&self, message: serde_json::Value) -> Result<(), HostError>;
}

impl MessagePort for UnboundedSender<serde_json::Value> {
    fn post_message(&self, message: serde_json::Value) -> Result<(), HostError> {
        self.send(message)
            .map_err(|_| HostError::new("post_message", "port closed"))
    }
}
