//! Single-writer wrapper around one engine-driven session. The harness (and
//! its bots) may poke at a session from several places; the mutex guarantees
//! at most one phase advance is in flight at a time, and `tick` only advances
//! when the engine reports the phase ready to close.

use mafia_core::config::EngineConfig;
use mafia_core::game::engine::GameEngine;
use mafia_core::model::player::{Player, PlayerId};
use mafia_core::model::session::Session;
use parking_lot::Mutex;

struct Slot {
    engine: GameEngine,
    session: Session,
}

pub struct SessionHost {
    slot: Mutex<Slot>,
}

impl SessionHost {
    /// Builds a lobby of `players` scripted participants and a seeded engine.
    pub fn new(code: impl Into<String>, players: usize, seed: u64, config: EngineConfig) -> Self {
        let host = Player::new(player_id(1), player_name(1), true, 0);
        let mut session = Session::new(code, host, 0);
        for i in 2..=players {
            session.add_player(Player::new(player_id(i), player_name(i), false, 0));
        }
        Self {
            slot: Mutex::new(Slot {
                engine: GameEngine::with_seed(config, seed),
                session,
            }),
        }
    }

    pub fn start(&self, now_ms: u64) {
        let mut slot = self.slot.lock();
        let Slot { engine, session } = &mut *slot;
        *session = engine.start_game(session, now_ms);
    }

    /// Reads the session under the lock.
    pub fn read<T>(&self, f: impl FnOnce(&Session) -> T) -> T {
        f(&self.slot.lock().session)
    }

    /// Runs a submission closure against the live session (votes, night
    /// actions, discussion events).
    pub fn submit(&self, f: impl FnOnce(&mut Session)) {
        f(&mut self.slot.lock().session)
    }

    /// Advances one phase if the engine reports it ready; returns the
    /// post-transition session when a transition happened.
    pub fn tick(&self, now_ms: u64) -> Option<Session> {
        let mut slot = self.slot.lock();
        if !slot.engine.ready_to_advance(&slot.session, now_ms) {
            return None;
        }
        let Slot { engine, session } = &mut *slot;
        *session = engine.advance_phase(session, now_ms);
        Some(session.clone())
    }
}

pub fn player_id(i: usize) -> PlayerId {
    PlayerId::new(format!("bot-{i:02}"))
}

pub fn player_name(i: usize) -> String {
    format!("Bot {i}")
}
