//! Scripted participants. Each bot reads only its own suspicion row, the way
//! a real client only sees its own beliefs, and submits through the same
//! session entry points a server would call.

use mafia_core::model::action::{DiscussionKind, TargetChoice};
use mafia_core::model::player::PlayerId;
use mafia_core::model::role::Role;
use mafia_core::model::session::Session;

const ACCUSE_THRESHOLD: f64 = 55.0;
const DEFEND_THRESHOLD: f64 = 25.0;
const VOTE_THRESHOLD: f64 = 45.0;

fn row_extreme(
    session: &Session,
    observer: &PlayerId,
    candidates: &[PlayerId],
    baseline: f64,
    highest: bool,
) -> Option<(PlayerId, f64)> {
    let game = session.game.as_ref()?;
    let mut best: Option<(PlayerId, f64)> = None;
    for candidate in candidates {
        if candidate == observer {
            continue;
        }
        let value = game.suspicion.value_or(observer, candidate, baseline);
        let better = match &best {
            None => true,
            Some((_, current)) => {
                if highest {
                    value > *current
                } else {
                    value < *current
                }
            }
        };
        if better {
            best = Some((candidate.clone(), value));
        }
    }
    best
}

/// Submits every special role's night action. The mafia coordinate on the
/// player their lead member trusts most (the likeliest power role), the
/// doctor guards their most trusted ally, the detective probes their top
/// suspect.
pub fn act_night(session: &mut Session, baseline: f64) {
    let living = session.living_ids();
    let mafia: Vec<PlayerId> = session
        .living_players()
        .filter(|p| p.role == Some(Role::Mafia))
        .map(|p| p.id.clone())
        .collect();
    let non_mafia: Vec<PlayerId> = session
        .living_players()
        .filter(|p| p.role != Some(Role::Mafia))
        .map(|p| p.id.clone())
        .collect();

    let hit = mafia
        .first()
        .and_then(|lead| row_extreme(session, lead, &non_mafia, baseline, false))
        .map(|(target, _)| target);
    if let Some(target) = hit {
        for member in &mafia {
            session.submit_night_action(member, TargetChoice::Player(target.clone()));
        }
    }

    let doctor = session
        .living_players()
        .find(|p| p.role == Some(Role::Doctor))
        .map(|p| p.id.clone());
    if let Some(doctor) = doctor {
        if let Some((ward, _)) = row_extreme(session, &doctor, &living, baseline, false) {
            session.submit_night_action(&doctor, TargetChoice::Player(ward));
        }
    }

    let detective = session
        .living_players()
        .find(|p| p.role == Some(Role::Detective))
        .map(|p| p.id.clone());
    if let Some(detective) = detective {
        if let Some((suspect, _)) = row_extreme(session, &detective, &living, baseline, true) {
            session.submit_night_action(&detective, TargetChoice::Player(suspect));
        }
    }
}

/// Submits one accusation or defense per sufficiently opinionated bot,
/// spread evenly across the discussion window so submission order is stable.
pub fn act_discussion(session: &mut Session, baseline: f64) {
    let Some(game) = session.game.as_ref() else {
        return;
    };
    let start = game.phase_start_ms;
    let window = game.phase_end_ms.saturating_sub(start);
    let living = session.living_ids();

    let mut planned: Vec<(PlayerId, TargetChoice, DiscussionKind, u64)> = Vec::new();
    for (index, actor) in living.iter().enumerate() {
        let Some((top, top_value)) = row_extreme(session, actor, &living, baseline, true) else {
            continue;
        };
        let at = start + window * (index as u64 + 1) / (living.len() as u64 + 1);
        if top_value >= ACCUSE_THRESHOLD {
            planned.push((actor.clone(), TargetChoice::Player(top), DiscussionKind::Accuse, at));
            continue;
        }
        if let Some((ally, ally_value)) = row_extreme(session, actor, &living, baseline, false) {
            if ally_value <= DEFEND_THRESHOLD {
                planned.push((
                    actor.clone(),
                    TargetChoice::Player(ally),
                    DiscussionKind::Defend,
                    at,
                ));
            }
        }
        // Otherwise stay quiet and eat the lurker penalty.
    }

    for (actor, target, kind, at) in planned {
        session.submit_discussion_event(&actor, target, kind, at);
    }
}

/// Every living bot votes its top suspect, or abstains below the threshold.
/// Timestamps are spread across the window so bandwagon order is meaningful.
pub fn act_voting(session: &mut Session, baseline: f64) {
    let Some(game) = session.game.as_ref() else {
        return;
    };
    let start = game.phase_start_ms;
    let window = game.phase_end_ms.saturating_sub(start);
    let living = session.living_ids();

    let mut planned: Vec<(PlayerId, TargetChoice, u64)> = Vec::new();
    for (index, voter) in living.iter().enumerate() {
        let at = start + window * (index as u64 + 1) / (living.len() as u64 + 1);
        let ballot = match row_extreme(session, voter, &living, baseline, true) {
            Some((top, value)) if value >= VOTE_THRESHOLD => TargetChoice::Player(top),
            _ => TargetChoice::Skip,
        };
        planned.push((voter.clone(), ballot, at));
    }

    for (voter, ballot, at) in planned {
        session.submit_vote(&voter, ballot, at);
    }
}
