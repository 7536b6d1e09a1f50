//! Tallies the day's ballots, judges the voters, and hands the town back to
//! the night (or ends the game).

use crate::belief::{BeliefEngine, RumorKind, UpdateMode};
use crate::game::engine::PhaseCx;
use crate::game::state::{GameState, Phase};
use crate::game::tally;
use crate::model::action::{DiscussionKind, TargetChoice, VoteRecord};
use crate::model::log::{LogEntry, LogKind};
use crate::model::player::PlayerId;
use crate::model::role::Role;
use crate::model::session::{Session, SessionStatus};
use std::collections::BTreeMap;

/// Voters for the winning target who arrived late: everyone from index
/// `floor(count * 0.6)` onward in submission order.
pub(crate) fn bandwagon_voters(
    votes: &BTreeMap<PlayerId, VoteRecord>,
    victim: &PlayerId,
) -> Vec<PlayerId> {
    let mut for_victim: Vec<(&PlayerId, u64)> = votes
        .iter()
        .filter(|(_, record)| record.target.player() == Some(victim))
        .map(|(voter, record)| (voter, record.timestamp_ms))
        .collect();
    for_victim.sort_by_key(|(_, ts)| *ts);

    let cutoff = (for_victim.len() as f64 * 0.6).floor() as usize;
    for_victim[cutoff..]
        .iter()
        .map(|(voter, _)| (*voter).clone())
        .collect()
}

fn ballots_cast_for(
    history: &BTreeMap<PlayerId, Vec<TargetChoice>>,
    voter: &PlayerId,
    victim: &PlayerId,
) -> usize {
    history
        .get(voter)
        .map(|past| {
            past.iter()
                .filter(|choice| choice.player() == Some(victim))
                .count()
        })
        .unwrap_or(0)
}

/// Retroactive trust shifts once a death reveals a role: voters who went
/// after a mafia member are vindicated, holdouts look complicit, and voters
/// who hounded an innocent look worse. Shared with night deaths, which only
/// apply the innocent branch at `innocent_scale` weight.
pub(crate) fn apply_historical_analysis(
    game: &mut GameState,
    all_ids: &[PlayerId],
    victim: &PlayerId,
    victim_was_mafia: bool,
    current_votes: Option<&BTreeMap<PlayerId, VoteRecord>>,
    innocent_scale: f64,
    cx: &mut PhaseCx<'_>,
) {
    let cfg = cx.cfg;
    let beliefs = BeliefEngine::new(cfg);
    let observers = game.suspicion.observer_ids();

    for observer in &observers {
        for target in all_ids {
            if target == observer || target == victim {
                continue;
            }

            let mut hits = ballots_cast_for(&game.voting_history, target, victim);
            if let Some(votes) = current_votes {
                if votes
                    .get(target)
                    .is_some_and(|record| record.target.player() == Some(victim))
                {
                    hits += 1;
                }
            }

            if victim_was_mafia {
                let weight = if hits > 0 {
                    cfg.weights.vindication_bonus * hits as f64
                } else {
                    cfg.weights.complicity_penalty
                };
                beliefs.nudge(
                    &mut game.suspicion,
                    observer,
                    target,
                    weight,
                    cfg.noise.history,
                    UpdateMode::Social,
                    cx.rng,
                );
            } else if hits > 0 {
                beliefs.nudge(
                    &mut game.suspicion,
                    observer,
                    target,
                    cfg.weights.wrong_accusation * hits as f64 * innocent_scale,
                    cfg.noise.history,
                    UpdateMode::Social,
                    cx.rng,
                );
            }
        }
    }
}

pub(crate) fn resolve(session: &Session, cx: &mut PhaseCx<'_>) -> Session {
    let mut next = session.clone();
    let Some(game) = next.game.as_mut() else {
        return next;
    };
    let cfg = cx.cfg;
    let beliefs = BeliefEngine::new(cfg);

    let votes = std::mem::take(&mut game.votes);
    let events = std::mem::take(&mut game.discussion_events);
    let all_ids: Vec<PlayerId> = next.players.keys().cloned().collect();
    let living_before = next.players.values().filter(|p| p.is_alive).count();

    let victim = tally::plurality(votes.values().map(|record| record.target.clone()));

    game.log(LogEntry::public(
        cx.now_ms,
        LogKind::Info,
        format!(
            "Voting ended. {}/{} cast ballots.",
            votes.len(),
            living_before
        ),
    ));

    let bandwagoners = victim
        .as_ref()
        .map(|v| bandwagon_voters(&votes, v))
        .unwrap_or_default();

    // Judge every voter through every observer's eyes: saying one thing and
    // voting another reads as hypocrisy, walking the talk earns a little
    // trust, and piling on late costs some.
    let observers = game.suspicion.observer_ids();
    for observer in &observers {
        for voter in &all_ids {
            if voter == observer {
                continue;
            }
            let Some(record) = votes.get(voter) else {
                continue;
            };
            let Some(voted_target) = record.target.player() else {
                continue;
            };

            let voter_events: Vec<_> = events.iter().filter(|e| e.actor == *voter).collect();
            let mut hypocrisy = 0.0_f64;
            for event in &voter_events {
                match event.kind {
                    DiscussionKind::Accuse if event.target.player() != Some(voted_target) => {
                        hypocrisy += 1.0;
                    }
                    DiscussionKind::Defend if event.target.player() == Some(voted_target) => {
                        hypocrisy += 1.5;
                    }
                    _ => {}
                }
            }

            if hypocrisy > 0.0 {
                beliefs.nudge(
                    &mut game.suspicion,
                    observer,
                    voter,
                    cfg.weights.hypocrite_penalty,
                    cfg.noise.hypocrite,
                    UpdateMode::Social,
                    cx.rng,
                );
            } else if !voter_events.is_empty() {
                beliefs.nudge(
                    &mut game.suspicion,
                    observer,
                    voter,
                    cfg.weights.consistent_bonus,
                    cfg.noise.hypocrite,
                    UpdateMode::Social,
                    cx.rng,
                );
            }

            if bandwagoners.contains(voter) {
                beliefs.nudge(
                    &mut game.suspicion,
                    observer,
                    voter,
                    cfg.weights.bandwagon_penalty,
                    cfg.noise.vote,
                    UpdateMode::Social,
                    cx.rng,
                );
            }
        }
    }

    if let Some(player) = victim.as_ref().and_then(|v| next.players.get_mut(v)) {
        player.is_alive = false;
        let victim_name = player.name.clone();
        let victim_role = player.role.unwrap_or(Role::Villager);
        let victim_id = player.id.clone();
        game.record_death(victim_role.faction());

        game.log(LogEntry::public(
            cx.now_ms,
            LogKind::Alert,
            format!(
                "{} was executed. Role: {}",
                victim_name,
                victim_role.as_str().to_uppercase()
            ),
        ));

        apply_historical_analysis(
            game,
            &all_ids,
            &victim_id,
            victim_role == Role::Mafia,
            Some(&votes),
            1.0,
            cx,
        );
    } else {
        game.log(LogEntry::public(
            cx.now_ms,
            LogKind::System,
            "No consensus reached.",
        ));
    }

    // The rumor mill turns whether or not anyone died.
    let living: Vec<PlayerId> = next
        .players
        .values()
        .filter(|p| p.is_alive)
        .map(|p| p.id.clone())
        .collect();
    if let Some(rumor) = beliefs.generate_rumor(&mut game.suspicion, &living, cx.rng) {
        let name = next
            .players
            .get(&rumor.target)
            .map(|p| p.name.as_str())
            .unwrap_or("someone");
        let text = match rumor.kind {
            RumorKind::Suspicious => format!("Whispers circulate about {name}..."),
            RumorKind::Trusted => format!("{name} seems unusually calm, reassuring some."),
        };
        game.log(LogEntry::public(cx.now_ms, LogKind::Info, text));
    }

    game.suspicion
        .drift(cfg.memory_drift_lambda, cfg.baseline);

    for (voter, record) in &votes {
        game.voting_history
            .entry(voter.clone())
            .or_default()
            .push(record.target.clone());
    }

    game.snapshot_suspicion();
    game.night_actions.clear();

    if let Some(winner) = game.winning_faction() {
        game.winner = Some(winner);
        game.enter_phase(Phase::GameOver, cx.now_ms, 0);
        next.status = SessionStatus::Finished;
    } else {
        game.enter_phase(Phase::Night, cx.now_ms, cfg.durations.night_ms);
    }
    next
}
