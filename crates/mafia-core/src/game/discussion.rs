//! Folds the discussion phase into every observer's suspicion row and opens
//! the voting booth.

use crate::belief::{BeliefEngine, UpdateMode};
use crate::game::engine::PhaseCx;
use crate::game::state::Phase;
use crate::model::action::DiscussionKind;
use crate::model::log::{LogEntry, LogKind};
use crate::model::session::Session;
use std::collections::BTreeSet;

pub(crate) fn resolve(session: &Session, cx: &mut PhaseCx<'_>) -> Session {
    let mut next = session.clone();
    let Some(game) = next.game.as_mut() else {
        return next;
    };
    let cfg = cx.cfg;
    let beliefs = BeliefEngine::new(cfg);

    game.log(LogEntry::public(
        cx.now_ms,
        LogKind::System,
        "Voting booths are open.",
    ));

    let events = game.discussion_events.clone();
    let observers = game.suspicion.observer_ids();

    // Silence is suspicious: anyone who produced no event this round takes a
    // small hit from every other observer.
    let active: BTreeSet<_> = events.iter().map(|e| e.actor.clone()).collect();
    let living: Vec<_> = session.living_ids();
    for lurker in living.iter().filter(|id| !active.contains(*id)) {
        for observer in &observers {
            beliefs.nudge(
                &mut game.suspicion,
                observer,
                lurker,
                cfg.weights.lurker_penalty,
                cfg.noise.reaction,
                UpdateMode::Social,
                cx.rng,
            );
        }
    }

    for observer in &observers {
        for event in &events {
            if event.actor == *observer || event.kind == DiscussionKind::Skip {
                continue;
            }
            let Some(target) = event.target.player() else {
                continue;
            };

            if *target == *observer {
                // They attacked me: I trust the accuser less, trust be damned.
                if event.kind == DiscussionKind::Accuse {
                    beliefs.nudge(
                        &mut game.suspicion,
                        observer,
                        &event.actor,
                        cfg.weights.defensive_reaction,
                        cfg.noise.reaction,
                        UpdateMode::Social,
                        cx.rng,
                    );
                }
                continue;
            }

            // An actor I already distrust moves me less; one I trust moves
            // me more.
            let sus_of_actor = game
                .suspicion
                .value_or(observer, &event.actor, cfg.baseline);
            let trust_factor = ((100.0 - sus_of_actor) / 100.0).max(0.1);

            match event.kind {
                DiscussionKind::Accuse => {
                    let impact = cfg.weights.accuse * trust_factor;
                    // Reverse psychology: an accusation from someone I
                    // actively suspect makes me trust the accused more.
                    let weight = if sus_of_actor > 60.0 {
                        -impact * 0.5
                    } else {
                        impact
                    };
                    beliefs.nudge(
                        &mut game.suspicion,
                        observer,
                        target,
                        weight,
                        cfg.noise.discussion,
                        UpdateMode::Social,
                        cx.rng,
                    );
                }
                DiscussionKind::Defend => {
                    let sus_of_target = game.suspicion.value_or(observer, target, cfg.baseline);
                    beliefs.nudge(
                        &mut game.suspicion,
                        observer,
                        target,
                        cfg.weights.defend * trust_factor,
                        cfg.noise.discussion,
                        UpdateMode::Social,
                        cx.rng,
                    );
                    // Guilt by association: defending someone I already
                    // consider scum reflects on the defender.
                    if sus_of_target > 70.0 {
                        beliefs.nudge(
                            &mut game.suspicion,
                            observer,
                            &event.actor,
                            cfg.weights.guilt_by_association,
                            cfg.noise.reaction,
                            UpdateMode::Social,
                            cx.rng,
                        );
                    }
                }
                DiscussionKind::Skip => {}
            }
        }
    }

    // Belief decay independent of new evidence, once per transition.
    game.suspicion
        .drift(cfg.memory_drift_lambda, cfg.baseline);

    game.votes.clear();
    game.enter_phase(Phase::Voting, cx.now_ms, cfg.durations.voting_ms);
    game.snapshot_suspicion();
    next
}
