//! Message contract between the host and the sidebar UI surface.
//!
//! Both directions are closed tagged unions: inbound messages carry a
//! `type` tag and fall back to an explicit no-op variant for unknown tags,
//! outbound events use the `{type, data}` envelope the webview expects.
//! The UI surface itself is an external collaborator; the host only ever
//! talks to it through these types and the [`UiSink`] seam.

use chat_provider::{Role, Turn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

/// Flattened transcript entry exchanged with the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: Role,
    pub text: String,
}

impl TranscriptTurn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn from_turn(turn: &Turn) -> Self {
        Self {
            role: turn.role,
            text: turn.text(),
        }
    }

    #[must_use]
    pub fn into_turn(self) -> Turn {
        match self.role {
            Role::User => Turn::user(self.text),
            Role::Model => Turn::model(self.text),
        }
    }
}

/// Inbound message from the UI surface.
///
/// Tags outside the known set deserialize to [`WebviewMessage::Unknown`],
/// which the coordinator treats as a no-op rather than a fault.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebviewMessage {
    AskQuestion {
        value: String,
        #[serde(default)]
        history: Option<Vec<TranscriptTurn>>,
    },
    SetModel {
        value: String,
    },
    ClearHistory,
    WebviewReady,
    #[serde(other)]
    Unknown,
}

/// Outbound event toward the UI surface, serialized as `{type, data}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum UiEvent {
    AddUserMessage(TranscriptTurn),
    AddMessage(TranscriptTurn),
    ReplaceLastMessage(TranscriptTurn),
    UpdateModels {
        models: Vec<String>,
        #[serde(rename = "currentModel")]
        current_model: String,
    },
    LoadHistory(Vec<TranscriptTurn>),
}

/// Fire-and-forget event sink toward the UI surface.
pub trait UiSink: Send + Sync {
    fn post(&self, event: UiEvent);
}

/// Channel-backed sink. A closed receiver drops events silently, keeping
/// the post contract fire-and-forget.
pub struct ChannelSink {
    sender: UnboundedSender<UiEvent>,
}

impl ChannelSink {
    #[must_use]
    pub fn new(sender: UnboundedSender<UiEvent>) -> Self {
        Self { sender }
    }
}

impl UiSink for ChannelSink {
    fn post(&self, event: UiEvent) {
        let _ = self.sender.send(event);
    }
}
