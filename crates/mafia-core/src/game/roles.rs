use crate::belief::SuspicionMatrix;
use crate::config::EngineConfig;
use crate::game::state::{GameState, Phase};
use crate::model::log::{LogEntry, LogKind};
use crate::model::role::Role;
use crate::model::session::{Session, SessionStatus};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeMap;

/// Role counts derived from the player count: `max(1, n/3)` mafia, a doctor
/// from four players, a detective from five, villagers for the rest.
pub(crate) fn build_role_pool(player_count: usize) -> Vec<Role> {
    let mafia_count = (player_count / 3).max(1);
    let mut pool = vec![Role::Mafia; mafia_count];
    if player_count >= 4 {
        pool.push(Role::Doctor);
    }
    if player_count >= 5 {
        pool.push(Role::Detective);
    }
    while pool.len() < player_count {
        pool.push(Role::Villager);
    }
    pool
}

/// Assigns shuffled roles, seeds the suspicion matrix, and opens the first
/// night. The input session is untouched; the started copy is returned.
pub(crate) fn initialize<R: Rng + ?Sized>(
    session: &Session,
    cfg: &EngineConfig,
    now_ms: u64,
    rng: &mut R,
) -> Session {
    let mut next = session.clone();
    let ids = next.player_ids();
    let player_count = ids.len();

    let mut pool = build_role_pool(player_count);
    pool.shuffle(rng);

    for (id, role) in ids.iter().zip(pool.iter()) {
        if let Some(player) = next.players.get_mut(id) {
            player.role = Some(*role);
            player.is_alive = true;
        }
    }

    let mafia_count = pool.iter().filter(|r| **r == Role::Mafia).count() as u32;

    // Mafia know each other from the start; strangers begin near baseline.
    let mut suspicion = SuspicionMatrix::new();
    for observer in &ids {
        suspicion.ensure_observer(observer);
        let observer_is_mafia = next.players[observer].is_mafia();
        for target in &ids {
            if observer == target {
                continue;
            }
            let value = if observer_is_mafia && next.players[target].is_mafia() {
                cfg.epsilon
            } else {
                cfg.baseline + rng.gen_range(-10.0..=10.0)
            };
            suspicion.set(observer, target, value);
        }
    }

    let voting_history: BTreeMap<_, _> = ids.iter().map(|id| (id.clone(), Vec::new())).collect();

    let mut game = GameState {
        phase: Phase::Night,
        round: 1,
        phase_start_ms: now_ms,
        phase_end_ms: now_ms + cfg.durations.night_ms,
        winner: None,
        logs: vec![LogEntry::public(
            now_ms,
            LogKind::System,
            "Night has fallen. Trust no one.",
        )],
        votes: BTreeMap::new(),
        night_actions: BTreeMap::new(),
        discussion_events: Vec::new(),
        suspicion,
        history: Vec::new(),
        voting_history,
        mafia_count,
        villager_count: player_count as u32 - mafia_count,
    };
    game.snapshot_suspicion();

    next.status = SessionStatus::InGame;
    next.game = Some(game);
    next
}
