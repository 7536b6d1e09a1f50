//! The engine that owns the RNG and drives sessions through the phase
//! machine. Callers hold the clock: every entry point takes `now_ms` and the
//! engine never reads wall time itself.

use crate::config::EngineConfig;
use crate::game::state::Phase;
use crate::game::{discussion, night, roles, voting};
use crate::model::role::Role;
use crate::model::session::Session;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Shared context threaded through the phase processors.
pub(crate) struct PhaseCx<'a> {
    pub cfg: &'a EngineConfig,
    pub rng: &'a mut StdRng,
    pub now_ms: u64,
}

/// Seeded driver for one or more sessions. Two engines built with the same
/// seed and fed the same submissions produce identical games.
pub struct GameEngine {
    config: EngineConfig,
    rng: StdRng,
    seed: u64,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Deals roles and opens the first night. Starting an already started
    /// session is a no-op clone.
    pub fn start_game(&mut self, session: &Session, now_ms: u64) -> Session {
        if session.game.is_some() {
            return session.clone();
        }
        roles::initialize(session, &self.config, now_ms, &mut self.rng)
    }

    /// Runs the current phase's processor and returns the successor session.
    /// Sessions without a game, and finished games, pass through unchanged.
    pub fn advance_phase(&mut self, session: &Session, now_ms: u64) -> Session {
        let Some(game) = session.game.as_ref() else {
            return session.clone();
        };
        let mut cx = PhaseCx {
            cfg: &self.config,
            rng: &mut self.rng,
            now_ms,
        };
        match game.phase {
            Phase::Night => night::resolve(session, &mut cx),
            Phase::Discussion => discussion::resolve(session, &mut cx),
            Phase::Voting => voting::resolve(session, &mut cx),
            Phase::GameOver => session.clone(),
        }
    }

    /// Whether the current phase can close: its deadline has passed, or every
    /// input it is waiting on has arrived. Discussion always runs its full
    /// window; a finished game never advances.
    pub fn ready_to_advance(&self, session: &Session, now_ms: u64) -> bool {
        let Some(game) = session.game.as_ref() else {
            return false;
        };
        if game.phase == Phase::GameOver {
            return false;
        }
        if now_ms >= game.phase_end_ms {
            return true;
        }

        match game.phase {
            Phase::Voting => session
                .living_players()
                .all(|p| game.votes.contains_key(&p.id)),
            Phase::Night => session
                .living_players()
                .filter(|p| {
                    matches!(p.role, Some(Role::Mafia | Role::Doctor | Role::Detective))
                })
                .all(|p| game.night_actions.contains_key(&p.id)),
            Phase::Discussion | Phase::GameOver => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GameEngine;
    use crate::config::EngineConfig;
    use crate::game::state::Phase;
    use crate::model::action::TargetChoice;
    use crate::model::player::{Player, PlayerId};
    use crate::model::role::Role;
    use crate::model::session::{Session, SessionStatus};

    fn id(i: usize) -> PlayerId {
        PlayerId::new(format!("p{i:02}"))
    }

    fn lobby(n: usize) -> Session {
        let host = Player::new(id(1), "Player 1", true, 0);
        let mut session = Session::new("ROOM", host, 0);
        for i in 2..=n {
            session.add_player(Player::new(id(i), format!("Player {i}"), false, 0));
        }
        session
    }

    #[test]
    fn five_player_setup_and_first_transition() {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), 99);
        let session = engine.start_game(&lobby(5), 0);

        assert_eq!(session.status, SessionStatus::InGame);
        let count = |role| {
            session
                .players
                .values()
                .filter(|p| p.role == Some(role))
                .count()
        };
        assert_eq!(count(Role::Mafia), 1);
        assert_eq!(count(Role::Doctor), 1);
        assert_eq!(count(Role::Detective), 1);
        assert_eq!(count(Role::Villager), 2);

        let game = session.game.as_ref().unwrap();
        assert_eq!(game.phase, Phase::Night);
        assert_eq!(game.round, 1);
        assert_eq!(game.phase_end_ms, 30_000);

        // Nobody acts; the night passes and discussion opens.
        let next = engine.advance_phase(&session, 30_000);
        let game = next.game.as_ref().unwrap();
        assert_eq!(game.phase, Phase::Discussion);
        assert_eq!(game.round, 2);
        assert_eq!(game.phase_end_ms, 30_000 + 180_000);
        assert!(next.players.values().all(|p| p.is_alive));
    }

    #[test]
    fn same_seed_same_submissions_same_game() {
        let run = || {
            let mut engine = GameEngine::with_seed(EngineConfig::default(), 1234);
            let mut session = engine.start_game(&lobby(6), 0);
            for _ in 0..6 {
                if session.game.as_ref().unwrap().phase == Phase::GameOver {
                    break;
                }
                let end = session.game.as_ref().unwrap().phase_end_ms;
                session = engine.advance_phase(&session, end);
            }
            session
        };

        let a = run();
        let b = run();
        let game_a = a.game.as_ref().unwrap();
        let game_b = b.game.as_ref().unwrap();
        assert_eq!(game_a.suspicion, game_b.suspicion);
        assert_eq!(game_a.history.len(), game_b.history.len());
        assert_eq!(game_a.round, game_b.round);
    }

    #[test]
    fn starting_twice_changes_nothing() {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), 7);
        let started = engine.start_game(&lobby(5), 0);
        let roles_before: Vec<_> = started.players.values().map(|p| p.role).collect();

        let again = engine.start_game(&started, 5_000);
        let roles_after: Vec<_> = again.players.values().map(|p| p.role).collect();
        assert_eq!(roles_before, roles_after);
    }

    #[test]
    fn advancing_a_lobby_is_a_no_op() {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), 7);
        let session = lobby(4);
        let next = engine.advance_phase(&session, 1_000);
        assert!(next.game.is_none());
        assert_eq!(next.status, SessionStatus::Waiting);
    }

    #[test]
    fn readiness_honors_deadlines_and_completeness() {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), 50);
        let mut session = engine.start_game(&lobby(5), 0);

        // Night: waiting on mafia, doctor, and detective.
        assert!(!engine.ready_to_advance(&session, 10_000));
        assert!(engine.ready_to_advance(&session, 30_000));

        let specials: Vec<PlayerId> = session
            .players
            .values()
            .filter(|p| p.role != Some(Role::Villager))
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(specials.len(), 3);
        for pid in &specials {
            session.submit_night_action(pid, TargetChoice::Skip);
        }
        assert!(engine.ready_to_advance(&session, 10_000));

        // Discussion never closes early, however quiet it is.
        let session = engine.advance_phase(&session, 30_000);
        assert!(!engine.ready_to_advance(&session, 30_001));
        assert!(engine.ready_to_advance(&session, 210_000));

        // Voting closes once every living player has a ballot in.
        let mut session = engine.advance_phase(&session, 210_000);
        assert!(!engine.ready_to_advance(&session, 211_000));
        for pid in session.living_ids() {
            session.submit_vote(&pid, TargetChoice::Skip, 211_000);
        }
        assert!(engine.ready_to_advance(&session, 211_000));
    }

    #[test]
    fn finished_games_never_report_ready() {
        let mut engine = GameEngine::with_seed(EngineConfig::default(), 60);
        let mut session = engine.start_game(&lobby(5), 0);
        if let Some(game) = session.game.as_mut() {
            game.phase = Phase::GameOver;
        }
        assert!(!engine.ready_to_advance(&session, u64::MAX));
    }
}
