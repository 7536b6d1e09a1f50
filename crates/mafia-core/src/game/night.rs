//! Resolves the night's hidden actions: the mafia hit, the doctor's save,
//! the detective's investigation, and the ambient dread in between.

use crate::belief::{BeliefEngine, Leaning, UpdateMode};
use crate::game::engine::PhaseCx;
use crate::game::state::Phase;
use crate::game::tally;
use crate::game::voting;
use crate::model::action::TargetChoice;
use crate::model::log::{LogEntry, LogKind};
use crate::model::player::{Player, PlayerId};
use crate::model::role::Role;
use crate::model::session::{Session, SessionStatus};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Default)]
struct NightOrders {
    mafia_ballots: Vec<TargetChoice>,
    doctor: Option<(PlayerId, TargetChoice)>,
    detective: Option<(PlayerId, TargetChoice)>,
}

fn partition_orders(session: &Session) -> NightOrders {
    let mut orders = NightOrders::default();
    let Some(game) = session.game.as_ref() else {
        return orders;
    };

    for (actor, target) in &game.night_actions {
        let Some(player) = session.player(actor) else {
            continue;
        };
        if !player.is_alive {
            continue;
        }
        match player.role {
            Some(Role::Mafia) => orders.mafia_ballots.push(target.clone()),
            Some(Role::Doctor) => orders.doctor = Some((actor.clone(), target.clone())),
            Some(Role::Detective) => orders.detective = Some((actor.clone(), target.clone())),
            _ => {}
        }
    }
    orders
}

pub(crate) fn resolve(session: &Session, cx: &mut PhaseCx<'_>) -> Session {
    let orders = partition_orders(session);

    let mut next = session.clone();
    let Some(game) = next.game.as_mut() else {
        return next;
    };
    let cfg = cx.cfg;
    let beliefs = BeliefEngine::new(cfg);
    let all_ids: Vec<PlayerId> = next.players.keys().cloned().collect();

    let mafia_target = tally::plurality(orders.mafia_ballots.iter().cloned());
    let doctor_target = orders
        .doctor
        .as_ref()
        .and_then(|(_, choice)| choice.player().cloned());

    // Protecting someone makes you trust them slightly more.
    if let (Some((doctor_id, _)), Some(guarded)) = (&orders.doctor, &doctor_target) {
        beliefs.nudge(
            &mut game.suspicion,
            doctor_id,
            guarded,
            cfg.weights.doctor_protect_bias,
            cfg.noise.private_result,
            UpdateMode::Direct,
            cx.rng,
        );
    }

    let mut victim_id: Option<PlayerId> = None;
    let mut doctor_saved = false;

    if let Some(target) = &mafia_target {
        if Some(target) == doctor_target.as_ref() {
            doctor_saved = true;

            if let Some((doctor_id, _)) = &orders.doctor {
                beliefs.nudge(
                    &mut game.suspicion,
                    doctor_id,
                    target,
                    cfg.weights.doctor_saved_innocent,
                    cfg.noise.private_result,
                    UpdateMode::Direct,
                    cx.rng,
                );
                beliefs.nudge(
                    &mut game.suspicion,
                    target,
                    doctor_id,
                    cfg.weights.guardian_angel_effect,
                    cfg.noise.guardian,
                    UpdateMode::Direct,
                    cx.rng,
                );
                beliefs.propagate_intuition(
                    &mut game.suspicion,
                    doctor_id,
                    target,
                    Leaning::Good,
                    &all_ids,
                    0.7,
                    cx.rng,
                );
            }

            // The failed hit gets covered up: plant the blame on a bystander.
            let scapegoats: Vec<PlayerId> = next
                .players
                .values()
                .filter(|p| p.is_alive && p.role != Some(Role::Mafia) && p.id != *target)
                .map(|p| p.id.clone())
                .collect();
            if let Some(scapegoat) = scapegoats.choose(cx.rng).cloned() {
                let observers = game.suspicion.observer_ids();
                for observer in &observers {
                    beliefs.nudge(
                        &mut game.suspicion,
                        observer,
                        &scapegoat,
                        cfg.weights.frame_up,
                        cfg.noise.frame_up,
                        UpdateMode::Direct,
                        cx.rng,
                    );
                }

                let mafia_ids: Vec<PlayerId> = next
                    .players
                    .values()
                    .filter(|p| p.is_mafia())
                    .map(|p| p.id.clone())
                    .collect();
                let scapegoat_name = next
                    .players
                    .get(&scapegoat)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                game.log(LogEntry::private(
                    cx.now_ms,
                    LogKind::Clue,
                    format!("Hit failed. Framed {scapegoat_name}."),
                    mafia_ids,
                ));
            }

            game.log(LogEntry::public(
                cx.now_ms,
                LogKind::Info,
                "A struggle was heard, but the Doctor intervened.",
            ));
            if let Some((doctor_id, _)) = &orders.doctor {
                let saved_name = next
                    .players
                    .get(target)
                    .map(|p| p.name.clone())
                    .unwrap_or_default();
                game.log(LogEntry::private(
                    cx.now_ms,
                    LogKind::Clue,
                    format!("SUCCESS: Saved {saved_name}."),
                    vec![doctor_id.clone()],
                ));
            }
        } else {
            victim_id = Some(target.clone());
        }
    }

    if let Some(player) = victim_id.as_ref().and_then(|v| next.players.get_mut(v)) {
        player.is_alive = false;
        let victim_name = player.name.clone();
        let victim_role = player.role.unwrap_or(Role::Villager);
        let victim = player.id.clone();
        game.record_death(victim_role.faction());

        game.log(LogEntry::public(
            cx.now_ms,
            LogKind::Alert,
            format!("{victim_name} was found dead."),
        ));
        game.log(LogEntry::public(
            cx.now_ms,
            LogKind::Info,
            format!("Role: {}", victim_role.as_str().to_uppercase()),
        ));

        // An innocent dying at night reflects on whoever hounded them by
        // ballot before, at half the daytime weight.
        if victim_role != Role::Mafia {
            voting::apply_historical_analysis(game, &all_ids, &victim, false, None, 0.5, cx);
        }
    } else if !doctor_saved {
        game.log(LogEntry::public(cx.now_ms, LogKind::System, "A quiet night."));
    }

    if let Some((detective_id, choice)) = &orders.detective {
        if let Some(suspect) = choice.player() {
            let found_mafia = next.players.get(suspect).is_some_and(Player::is_mafia);
            let (weight, leaning) = if found_mafia {
                (cfg.weights.detective_found_mafia, Leaning::Bad)
            } else {
                (cfg.weights.detective_found_innocent, Leaning::Good)
            };
            beliefs.nudge(
                &mut game.suspicion,
                detective_id,
                suspect,
                weight,
                cfg.noise.private_result,
                UpdateMode::Direct,
                cx.rng,
            );
            beliefs.propagate_intuition(
                &mut game.suspicion,
                detective_id,
                suspect,
                leaning,
                &all_ids,
                1.0,
                cx.rng,
            );

            let updated = game.suspicion.value_or(detective_id, suspect, cfg.baseline);
            let suspect_name = next
                .players
                .get(suspect)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            game.log(LogEntry::private(
                cx.now_ms,
                LogKind::Clue,
                format!(
                    "Investigation on {suspect_name}: Suspicion updated to {}%.",
                    updated.round()
                ),
                vec![detective_id.clone()],
            ));
        }
    }

    // Ambient paranoia: nights are unsettling even when nothing happens.
    let living: Vec<PlayerId> = next
        .players
        .values()
        .filter(|p| p.is_alive)
        .map(|p| p.id.clone())
        .collect();
    for observer in &living {
        for target in &all_ids {
            if target == observer {
                continue;
            }
            let weight = cx.rng.gen_range(-cfg.weights.paranoia_range..=cfg.weights.paranoia_range);
            beliefs.nudge(
                &mut game.suspicion,
                observer,
                target,
                weight,
                cfg.noise.paranoia,
                UpdateMode::Social,
                cx.rng,
            );
        }
    }

    game.snapshot_suspicion();
    game.night_actions.clear();
    game.round += 1;

    if let Some(winner) = game.winning_faction() {
        game.winner = Some(winner);
        game.enter_phase(Phase::GameOver, cx.now_ms, 0);
        next.status = SessionStatus::Finished;
    } else {
        game.enter_phase(Phase::Discussion, cx.now_ms, cfg.durations.discussion_ms);
    }
    next
}

#[cfg(test)]
mod tests {
    use crate::config::{EngineConfig, NoiseWidths};
    use crate::game::engine::GameEngine;
    use crate::game::state::Phase;
    use crate::model::action::TargetChoice;
    use crate::model::player::{Player, PlayerId};
    use crate::model::role::{Faction, Role};
    use crate::model::session::Session;

    fn quiet_config() -> EngineConfig {
        EngineConfig {
            misread_odds: 0.0,
            noise: NoiseWidths {
                vote: 0.0,
                discussion: 0.0,
                private_leak: 0.0,
                hypocrite: 0.0,
                history: 0.0,
                reaction: 0.0,
                frame_up: 0.0,
                rumor: 0.0,
                paranoia: 0.0,
                private_result: 0.0,
                guardian: 0.0,
            },
            ..EngineConfig::default()
        }
    }

    fn id(i: usize) -> PlayerId {
        PlayerId::new(format!("p{i:02}"))
    }

    fn in_first_night_with(n: usize, seed: u64, cfg: EngineConfig) -> (GameEngine, Session) {
        let host = Player::new(id(1), "Player 1", true, 0);
        let mut session = Session::new("ROOM", host, 0);
        for i in 2..=n {
            session.add_player(Player::new(id(i), format!("Player {i}"), false, 0));
        }
        let mut engine = GameEngine::with_seed(cfg, seed);
        let session = engine.start_game(&session, 0);
        (engine, session)
    }

    fn in_first_night(n: usize, seed: u64) -> (GameEngine, Session) {
        in_first_night_with(n, seed, quiet_config())
    }

    fn find_role(session: &Session, role: Role) -> PlayerId {
        session
            .players
            .values()
            .find(|p| p.role == Some(role))
            .map(|p| p.id.clone())
            .unwrap()
    }

    #[test]
    fn unopposed_mafia_target_dies() {
        let (mut engine, mut session) = in_first_night(5, 40);
        let mafia = find_role(&session, Role::Mafia);
        let victim = session
            .living_ids()
            .into_iter()
            .find(|pid| *pid != mafia)
            .unwrap();
        session.submit_night_action(&mafia, TargetChoice::Player(victim.clone()));

        let next = engine.advance_phase(&session, 30_000);
        assert!(!next.players[&victim].is_alive);
        let game = next.game.as_ref().unwrap();
        assert!(game.logs.iter().any(|l| l.text.contains("was found dead")));
        assert_eq!(game.round, 2);
    }

    #[test]
    fn doctor_save_spares_the_victim_and_frames_a_bystander() {
        let (mut engine, mut session) = in_first_night(6, 41);
        let cfg = engine.config().clone();
        let mafia = find_role(&session, Role::Mafia);
        let doctor = find_role(&session, Role::Doctor);
        let target = session
            .living_ids()
            .into_iter()
            .find(|pid| *pid != mafia && *pid != doctor && !session.players[pid].is_mafia())
            .unwrap();

        session.submit_night_action(&mafia, TargetChoice::Player(target.clone()));
        session.submit_night_action(&doctor, TargetChoice::Player(target.clone()));

        let doc_before = session
            .game
            .as_ref()
            .unwrap()
            .suspicion
            .value_or(&doctor, &target, cfg.baseline);

        let next = engine.advance_phase(&session, 30_000);
        assert!(next.players.values().all(|p| p.is_alive));

        let game = next.game.as_ref().unwrap();
        assert!(game.logs.iter().any(|l| l.text.contains("Doctor intervened")));
        assert!(
            game.logs
                .iter()
                .any(|l| l.text.starts_with("Hit failed. Framed") && !l.is_public())
        );

        // Protect bias plus the save bonus: strictly down, noise-free.
        let doc_after = game.suspicion.value_or(&doctor, &target, cfg.baseline);
        assert!(doc_after < doc_before);
    }

    #[test]
    fn framed_scapegoat_rises_for_every_observer() {
        // Paranoia and the doctor's intuition leak both brush scapegoat
        // cells; zero their weights so the frame-up is the only nudge left.
        let mut cfg = quiet_config();
        cfg.weights.paranoia_range = 0.0;
        cfg.weights.intuition_leak = 0.0;
        let (mut engine, mut session) = in_first_night_with(6, 46, cfg);
        let cfg = engine.config().clone();
        let mafia = find_role(&session, Role::Mafia);
        let doctor = find_role(&session, Role::Doctor);
        let target = session
            .living_ids()
            .into_iter()
            .find(|pid| *pid != mafia && *pid != doctor && !session.players[pid].is_mafia())
            .unwrap();

        session.submit_night_action(&mafia, TargetChoice::Player(target.clone()));
        session.submit_night_action(&doctor, TargetChoice::Player(target.clone()));
        let before = session.game.as_ref().unwrap().suspicion.clone();

        let next = engine.advance_phase(&session, 30_000);
        let game = next.game.as_ref().unwrap();

        let clue = game
            .logs
            .iter()
            .find(|l| l.text.starts_with("Hit failed. Framed "))
            .expect("frame-up clue logged");
        let framed_name = clue
            .text
            .trim_start_matches("Hit failed. Framed ")
            .trim_end_matches('.');
        let scapegoat = next
            .players
            .values()
            .find(|p| p.name == framed_name)
            .map(|p| p.id.clone())
            .expect("framed name maps back to a player");

        for observer in game.suspicion.observer_ids() {
            if observer == scapegoat {
                continue;
            }
            // When the doctor takes the blame, the saved player's gratitude
            // lands on the same cell as the planted evidence; skip that one.
            if scapegoat == doctor && observer == target {
                continue;
            }
            let was = before.value_or(&observer, &scapegoat, cfg.baseline);
            let now = game.suspicion.value_or(&observer, &scapegoat, cfg.baseline);
            assert!(now > was, "{observer} did not buy the frame-up: {was} -> {now}");
        }
    }

    #[test]
    fn detective_directionality_is_strict() {
        let (mut engine, mut session) = in_first_night(7, 42);
        let cfg = engine.config().clone();
        let detective = find_role(&session, Role::Detective);
        let mafia = find_role(&session, Role::Mafia);
        session.submit_night_action(&detective, TargetChoice::Player(mafia.clone()));

        let before = session
            .game
            .as_ref()
            .unwrap()
            .suspicion
            .value_or(&detective, &mafia, cfg.baseline);
        let next = engine.advance_phase(&session, 30_000);
        let game = next.game.as_ref().unwrap();

        // Paranoia also brushes this cell, but its maximum magnitude is far
        // below the 1.2 investigation weight.
        let after = game.suspicion.value_or(&detective, &mafia, cfg.baseline);
        assert!(after > before);
        assert!(
            game.logs
                .iter()
                .any(|l| l.text.contains("Investigation on") && !l.is_public())
        );
    }

    #[test]
    fn detective_clears_an_innocent() {
        let (mut engine, mut session) = in_first_night(7, 43);
        let cfg = engine.config().clone();
        let detective = find_role(&session, Role::Detective);
        let innocent = session
            .living_ids()
            .into_iter()
            .find(|pid| !session.players[pid].is_mafia() && *pid != detective)
            .unwrap();
        session.submit_night_action(&detective, TargetChoice::Player(innocent.clone()));

        let before = session
            .game
            .as_ref()
            .unwrap()
            .suspicion
            .value_or(&detective, &innocent, cfg.baseline);
        let next = engine.advance_phase(&session, 30_000);
        let after = next
            .game
            .as_ref()
            .unwrap()
            .suspicion
            .value_or(&detective, &innocent, cfg.baseline);
        assert!(after < before);
    }

    #[test]
    fn tied_mafia_ballots_kill_no_one() {
        let (mut engine, mut session) = in_first_night(9, 44);
        let mafia: Vec<PlayerId> = session
            .players
            .values()
            .filter(|p| p.is_mafia())
            .map(|p| p.id.clone())
            .collect();
        assert_eq!(mafia.len(), 3);

        let villagers: Vec<PlayerId> = session
            .living_ids()
            .into_iter()
            .filter(|pid| !session.players[pid].is_mafia())
            .collect();
        session.submit_night_action(&mafia[0], TargetChoice::Player(villagers[0].clone()));
        session.submit_night_action(&mafia[1], TargetChoice::Player(villagers[1].clone()));
        session.submit_night_action(&mafia[2], TargetChoice::Skip);

        let next = engine.advance_phase(&session, 30_000);
        assert!(next.players.values().all(|p| p.is_alive));
        let game = next.game.as_ref().unwrap();
        assert!(game.logs.iter().any(|l| l.text == "A quiet night."));
        assert_eq!(game.phase, Phase::Discussion);
    }

    #[test]
    fn night_kill_can_hand_the_mafia_the_game() {
        let (mut engine, mut session) = in_first_night(4, 45);
        // 4 players: 1 mafia, 1 doctor, 2 villagers. Two villager deaths in
        // a row bring the mafia to parity.
        let mafia = find_role(&session, Role::Mafia);

        for _ in 0..8 {
            let game = session.game.as_ref().unwrap();
            if game.phase == Phase::GameOver {
                break;
            }
            if game.phase == Phase::Night {
                let victim = session
                    .living_ids()
                    .into_iter()
                    .find(|pid| !session.players[pid].is_mafia())
                    .unwrap();
                session.submit_night_action(&mafia, TargetChoice::Player(victim));
            }
            let end = session.game.as_ref().unwrap().phase_end_ms;
            session = engine.advance_phase(&session, end);
        }

        let game = session.game.as_ref().unwrap();
        assert_eq!(game.phase, Phase::GameOver);
        assert_eq!(game.winner, Some(Faction::Mafia));
        assert!(session.players[&mafia].is_alive);
    }
}
