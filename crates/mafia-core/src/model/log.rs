use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    System,
    Chat,
    Alert,
    Clue,
    Info,
}

/// A tagged log entry. The engine never filters: `visible_to` restricts
/// delivery, and its absence means public; routing is the bridge layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub kind: LogKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_to: Option<Vec<PlayerId>>,
}

impl LogEntry {
    pub fn public(timestamp_ms: u64, kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            kind,
            text: text.into(),
            visible_to: None,
        }
    }

    pub fn private(
        timestamp_ms: u64,
        kind: LogKind,
        text: impl Into<String>,
        visible_to: Vec<PlayerId>,
    ) -> Self {
        Self {
            timestamp_ms,
            kind,
            text: text.into(),
            visible_to: Some(visible_to),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visible_to.is_none()
    }
}
