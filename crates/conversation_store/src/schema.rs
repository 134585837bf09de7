use chat_provider::{Role, Turn, TurnPart};
use serde::{Deserialize, Serialize};

/// First line of every conversation file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationHeader {
    pub version: u32,
    pub conversation_id: String,
    pub created_at: String,
    pub workspace: String,
}

impl ConversationHeader {
    #[must_use]
    pub fn v1(
        conversation_id: impl Into<String>,
        created_at: impl Into<String>,
        workspace: impl Into<String>,
    ) -> Self {
        Self {
            version: 1,
            conversation_id: conversation_id.into(),
            created_at: created_at.into(),
            workspace: workspace.into(),
        }
    }
}

/// One persisted conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurnRecord {
    pub ts: String,
    pub role: Role,
    pub parts: Vec<TurnPart>,
}

impl TurnRecord {
    #[must_use]
    pub fn new(ts: impl Into<String>, turn: Turn) -> Self {
        Self {
            ts: ts.into(),
            role: turn.role,
            parts: turn.parts,
        }
    }

    #[must_use]
    pub fn into_turn(self) -> Turn {
        Turn {
            role: self.role,
            parts: self.parts,
        }
    }
}

/// Line-level discriminated record; the `type` tag is owned by this enum so
/// the inner structs stay free of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum JsonLine {
    Conversation(ConversationHeader),
    Turn(TurnRecord),
}
