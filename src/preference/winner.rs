use crate::model::common::ActivityId;

use super::tally::Tally;

/// Find the Condorcet winner: the candidate beating every other candidate in
/// its head-to-head duel by a strict majority.
///
/// Candidates are tried in the order given (callers pass ascending IDs). At
/// most one candidate can beat all others, so the order only affects how soon
/// the search stops. `None` means the majority preferences are cyclic or tied,
/// which is a normal outcome. An empty candidate set has no winner and a
/// single candidate wins unopposed.
pub fn find_winner(candidates: &[ActivityId], tally: &Tally) -> Option<ActivityId> {
    candidates.iter().copied().find(|&a| {
        candidates
            .iter()
            .all(|&b| a == b || tally.beats(a, b))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crate::model::mongodb::Id;
    use crate::preference::RankingsByBallot;

    use super::*;

    fn winner_of(candidates: &[ActivityId], ballots: &[&[(ActivityId, i64)]]) -> Option<ActivityId> {
        let rankings: RankingsByBallot = ballots
            .iter()
            .map(|ballot| (Id::new(), ballot.iter().copied().collect()))
            .collect();
        let set = candidates.iter().copied().collect::<BTreeSet<_>>();
        let tally = Tally::build(&set, &rankings);
        find_winner(candidates, &tally)
    }

    #[test]
    fn cyclic_majority_has_no_winner() {
        let winner = winner_of(
            &[1, 2, 3],
            &[
                &[(1, 1), (2, 2), (3, 3)],
                &[(2, 1), (3, 2), (1, 3)],
                &[(3, 1), (1, 2), (2, 3)],
            ],
        );
        assert_eq!(winner, None);
    }

    #[test]
    fn unanimous_first_choice_wins() {
        let winner = winner_of(
            &[5, 6, 7],
            &[
                &[(5, 1), (6, 2), (7, 3)],
                &[(5, 1), (7, 2), (6, 3)],
                &[(5, 1), (6, 2), (7, 3)],
            ],
        );
        assert_eq!(winner, Some(5));
    }

    #[test]
    fn winner_beats_each_rival_head_to_head() {
        // 2 is first on only one ballot but wins both of its duels 2-1.
        let winner = winner_of(
            &[1, 2, 3],
            &[
                &[(1, 1), (2, 2), (3, 3)],
                &[(3, 1), (2, 2), (1, 3)],
                &[(2, 1), (1, 2), (3, 3)],
            ],
        );
        assert_eq!(winner, Some(2));
    }

    #[test]
    fn tied_duel_blocks_victory() {
        let winner = winner_of(&[1, 2], &[&[(1, 1), (2, 2)], &[(2, 1), (1, 2)]]);
        assert_eq!(winner, None);
    }

    #[test]
    fn single_candidate_wins_unopposed() {
        assert_eq!(winner_of(&[9], &[&[(9, 1)], &[(9, 1), (4, 2)]]), Some(9));
    }

    #[test]
    fn no_candidates_no_winner() {
        assert_eq!(find_winner(&[], &Tally::default()), None);
    }

    #[test]
    fn unranked_candidate_blocks_victory() {
        // Nobody ranked 3, so 1 never beats it and there is no winner.
        let winner = winner_of(&[1, 2, 3], &[&[(1, 1), (2, 2)], &[(1, 1), (2, 2)]]);
        assert_eq!(winner, None);
    }
}
