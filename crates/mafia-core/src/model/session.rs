use crate::game::state::{GameState, Phase};
use crate::model::action::{DiscussionEvent, DiscussionKind, TargetChoice, VoteRecord};
use crate::model::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Waiting,
    InGame,
    Finished,
}

/// One lobby and, once started, its game. Sessions are independently owned
/// units of mutable state: phase transitions consume a session by reference
/// and return a replacement, so callers can enforce a single writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub code: String,
    pub host_id: PlayerId,
    pub status: SessionStatus,
    pub players: BTreeMap<PlayerId, Player>,
    pub created_at_ms: u64,
    pub game: Option<GameState>,
}

impl Session {
    pub fn new(code: impl Into<String>, host: Player, created_at_ms: u64) -> Self {
        let host_id = host.id.clone();
        let mut players = BTreeMap::new();
        players.insert(host_id.clone(), host);
        Self {
            code: code.into(),
            host_id,
            status: SessionStatus::Waiting,
            players,
            created_at_ms,
            game: None,
        }
    }

    /// Adds a participant to the roster; joining an in-flight game is refused
    /// by silently dropping the request, matching the lobby contract.
    pub fn add_player(&mut self, player: Player) {
        if self.status == SessionStatus::Waiting {
            self.players.insert(player.id.clone(), player);
        }
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn living_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_alive)
    }

    pub fn living_ids(&self) -> Vec<PlayerId> {
        self.living_players().map(|p| p.id.clone()).collect()
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().cloned().collect()
    }

    fn is_living(&self, id: &PlayerId) -> bool {
        self.players.get(id).is_some_and(|p| p.is_alive)
    }

    /// Records a ballot for the current voting phase. Dead voters, absent
    /// games, and out-of-phase submissions are ignored rather than rejected.
    pub fn submit_vote(&mut self, voter: &PlayerId, target: TargetChoice, now_ms: u64) {
        if !self.is_living(voter) {
            return;
        }
        if let Some(game) = self.game.as_mut() {
            if game.phase == Phase::Voting {
                game.votes.insert(
                    voter.clone(),
                    VoteRecord {
                        target,
                        timestamp_ms: now_ms,
                    },
                );
            }
        }
    }

    /// Records a night target for a living actor; the latest submission wins.
    pub fn submit_night_action(&mut self, actor: &PlayerId, target: TargetChoice) {
        if !self.is_living(actor) {
            return;
        }
        if let Some(game) = self.game.as_mut() {
            if game.phase == Phase::Night {
                game.night_actions.insert(actor.clone(), target);
            }
        }
    }

    /// Appends an accuse/defend/skip event to the current discussion phase.
    pub fn submit_discussion_event(
        &mut self,
        actor: &PlayerId,
        target: TargetChoice,
        kind: DiscussionKind,
        now_ms: u64,
    ) {
        if !self.is_living(actor) {
            return;
        }
        if let Some(game) = self.game.as_mut() {
            if game.phase == Phase::Discussion {
                game.discussion_events.push(DiscussionEvent {
                    actor: actor.clone(),
                    target,
                    kind,
                    timestamp_ms: now_ms,
                });
            }
        }
    }
}
