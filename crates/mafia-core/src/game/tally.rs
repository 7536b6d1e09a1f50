use crate::model::action::TargetChoice;
use crate::model::player::PlayerId;
use std::collections::BTreeMap;

/// Counts ballots and resolves a plurality winner. A strict tie at the top
/// count nullifies the result, and an abstention bucket can never win.
pub(crate) fn plurality(ballots: impl Iterator<Item = TargetChoice>) -> Option<PlayerId> {
    let mut counts: BTreeMap<TargetChoice, u32> = BTreeMap::new();
    for ballot in ballots {
        *counts.entry(ballot).or_insert(0) += 1;
    }

    let max = counts.values().copied().max()?;
    let mut leaders = counts.iter().filter(|(_, count)| **count == max);
    let (choice, _) = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    choice.player().cloned()
}

#[cfg(test)]
mod tests {
    use super::plurality;
    use crate::model::action::TargetChoice;
    use crate::model::player::PlayerId;

    fn vote(s: &str) -> TargetChoice {
        TargetChoice::Player(PlayerId::from(s))
    }

    #[test]
    fn clear_leader_wins() {
        let ballots = vec![vote("x"), vote("x"), vote("y")];
        assert_eq!(plurality(ballots.into_iter()), Some(PlayerId::from("x")));
    }

    #[test]
    fn strict_tie_nullifies() {
        let ballots = vec![vote("x"), vote("x"), vote("y"), vote("y"), vote("z")];
        assert_eq!(plurality(ballots.into_iter()), None);
    }

    #[test]
    fn skip_bucket_never_wins() {
        let ballots = vec![TargetChoice::Skip, TargetChoice::Skip, vote("x")];
        assert_eq!(plurality(ballots.into_iter()), None);
    }

    #[test]
    fn tie_with_skip_also_nullifies() {
        let ballots = vec![TargetChoice::Skip, vote("x")];
        assert_eq!(plurality(ballots.into_iter()), None);
    }

    #[test]
    fn no_ballots_no_winner() {
        assert_eq!(plurality(std::iter::empty()), None);
    }
}
