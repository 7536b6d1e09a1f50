use crate::model::role::Role;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque participant identifier handed in by the lobby layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_alive: bool,
    pub joined_at_ms: u64,
    /// Unset until role assignment at game start; written exactly once.
    pub role: Option<Role>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool, joined_at_ms: u64) -> Self {
        Self {
            id,
            name: name.into(),
            is_host,
            is_alive: true,
            joined_at_ms,
            role: None,
        }
    }

    pub fn is_mafia(&self) -> bool {
        self.role == Some(Role::Mafia)
    }
}

#[cfg(test)]
mod tests {
    use super::{Player, PlayerId};

    #[test]
    fn new_player_is_alive_without_role() {
        let player = Player::new(PlayerId::from("p1"), "Ada", true, 0);
        assert!(player.is_alive);
        assert!(player.role.is_none());
        assert!(!player.is_mafia());
    }

    #[test]
    fn id_round_trips_through_display() {
        let id = PlayerId::new("abc-123");
        assert_eq!(id.to_string(), "abc-123");
        assert_eq!(id.as_str(), "abc-123");
    }
}
