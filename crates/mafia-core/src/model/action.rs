use crate::model::player::PlayerId;
use serde::{Deserialize, Serialize};

/// A submitted target: either another participant or an explicit abstention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetChoice {
    Player(PlayerId),
    Skip,
}

impl TargetChoice {
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            TargetChoice::Player(id) => Some(id),
            TargetChoice::Skip => None,
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, TargetChoice::Skip)
    }
}

/// One ballot per living voter per voting phase; overwritten on resubmit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub target: TargetChoice,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionKind {
    Accuse,
    Defend,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionEvent {
    pub actor: PlayerId,
    pub target: TargetChoice,
    pub kind: DiscussionKind,
    pub timestamp_ms: u64,
}
