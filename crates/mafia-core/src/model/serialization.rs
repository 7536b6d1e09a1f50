use crate::model::session::Session;

/// The state snapshot re-emitted for the persistence/broadcast layer after
/// every phase transition: the full session, serialized as-is.
#[derive(Debug, Clone)]
pub struct SessionSnapshot;

impl SessionSnapshot {
    pub fn to_json(session: &Session) -> serde_json::Result<String> {
        serde_json::to_string(session)
    }

    pub fn to_json_pretty(session: &Session) -> serde_json::Result<String> {
        serde_json::to_string_pretty(session)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Session> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::SessionSnapshot;
    use crate::model::player::{Player, PlayerId};
    use crate::model::session::Session;

    fn session() -> Session {
        let host = Player::new(PlayerId::from("p1"), "Ada", true, 7);
        let mut session = Session::new("ROOM", host, 7);
        session.add_player(Player::new(PlayerId::from("p2"), "Ben", false, 8));
        session
    }

    #[test]
    fn snapshot_round_trips_a_lobby() {
        let original = session();
        let json = SessionSnapshot::to_json(&original).unwrap();
        let restored = SessionSnapshot::from_json(&json).unwrap();
        assert_eq!(restored.code, "ROOM");
        assert_eq!(restored.players.len(), 2);
        assert!(restored.game.is_none());
    }

    #[test]
    fn pretty_snapshot_names_the_status() {
        let json = SessionSnapshot::to_json_pretty(&session()).unwrap();
        assert!(json.contains("\"status\": \"waiting\""));
    }
}
