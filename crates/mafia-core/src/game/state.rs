use crate::belief::SuspicionMatrix;
use crate::model::action::{DiscussionEvent, TargetChoice, VoteRecord};
use crate::model::log::LogEntry;
use crate::model::player::PlayerId;
use crate::model::role::Faction;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Night,
    Discussion,
    Voting,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Night => "night",
            Phase::Discussion => "discussion",
            Phase::Voting => "voting",
            Phase::GameOver => "game-over",
        };
        f.write_str(label)
    }
}

/// Everything the engine owns for one running game. Transitions replace the
/// whole value; pending buffers come back empty for the next phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: Phase,
    pub round: u32,
    pub phase_start_ms: u64,
    pub phase_end_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Faction>,
    pub logs: Vec<LogEntry>,
    /// voter -> ballot, current voting phase only.
    pub votes: BTreeMap<PlayerId, VoteRecord>,
    /// actor -> target, current night phase only.
    pub night_actions: BTreeMap<PlayerId, TargetChoice>,
    pub discussion_events: Vec<DiscussionEvent>,
    pub suspicion: SuspicionMatrix,
    /// One suspicion snapshot per phase transition, append-only.
    pub history: Vec<SuspicionMatrix>,
    /// player -> every ballot they ever cast, append-only, never cleared.
    pub voting_history: BTreeMap<PlayerId, Vec<TargetChoice>>,
    pub mafia_count: u32,
    pub villager_count: u32,
}

impl GameState {
    /// Villagers win the moment the mafia are gone; the mafia win the moment
    /// they reach parity. At most one of these can hold.
    pub fn winning_faction(&self) -> Option<Faction> {
        if self.mafia_count == 0 {
            Some(Faction::Villager)
        } else if self.mafia_count >= self.villager_count {
            Some(Faction::Mafia)
        } else {
            None
        }
    }

    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
    }

    pub fn snapshot_suspicion(&mut self) {
        self.history.push(self.suspicion.clone());
    }

    pub(crate) fn record_death(&mut self, faction: Faction) {
        match faction {
            Faction::Mafia => self.mafia_count = self.mafia_count.saturating_sub(1),
            Faction::Villager => self.villager_count = self.villager_count.saturating_sub(1),
        }
    }

    pub(crate) fn enter_phase(&mut self, phase: Phase, now_ms: u64, duration_ms: u64) {
        self.phase = phase;
        self.phase_start_ms = now_ms;
        self.phase_end_ms = now_ms + duration_ms;
    }
}
