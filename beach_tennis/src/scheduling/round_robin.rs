//! Round-robin pairing using the circle method.
//!
//! The first slot stays fixed while the others rotate one position per
//! round. An odd team count gets a BYE slot appended; whoever faces the BYE
//! sits that round out.

/// One pairing of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing<T> {
    pub home: T,
    pub away: T,
}

/// Number of rounds needed for `team_count` teams
pub fn round_count(team_count: usize) -> usize {
    match team_count {
        0 | 1 => 0,
        n if n % 2 == 0 => n - 1,
        n => n,
    }
}

/// Number of matches in a complete round robin of `team_count` teams
pub fn match_count(team_count: usize) -> usize {
    team_count * team_count.saturating_sub(1) / 2
}

/// Generate every round of a single round robin.
///
/// Round `r` (0-indexed) pairs `slots[i]` against `slots[n - 1 - i]` for
/// `i < n / 2`. After each round the last slot is moved to index 1.
/// Pairings against the BYE are dropped, so each round of an odd-sized
/// group has one idle team.
pub fn circle_rounds<T: Copy>(teams: &[T]) -> Vec<Vec<Pairing<T>>> {
    if teams.len() < 2 {
        return Vec::new();
    }

    // `None` marks the BYE slot
    let mut slots: Vec<Option<T>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let n = slots.len();
    let mut rounds = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        let round = (0..n / 2)
            .filter_map(|i| match (slots[i], slots[n - 1 - i]) {
                (Some(home), Some(away)) => Some(Pairing { home, away }),
                _ => None,
            })
            .collect();
        rounds.push(round);

        if let Some(last) = slots.pop() {
            slots.insert(1, last);
        }
    }

    rounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unordered(p: &Pairing<char>) -> (char, char) {
        if p.home < p.away {
            (p.home, p.away)
        } else {
            (p.away, p.home)
        }
    }

    #[test]
    fn test_four_teams() {
        let rounds = circle_rounds(&['A', 'B', 'C', 'D']);
        assert_eq!(rounds.len(), 3);
        assert!(rounds.iter().all(|r| r.len() == 2));

        // Exact circle-method output
        let as_tuples: Vec<Vec<(char, char)>> = rounds
            .iter()
            .map(|r| r.iter().map(|p| (p.home, p.away)).collect())
            .collect();
        assert_eq!(
            as_tuples,
            vec![
                vec![('A', 'D'), ('B', 'C')],
                vec![('A', 'C'), ('D', 'B')],
                vec![('A', 'B'), ('C', 'D')],
            ]
        );

        let pairs: HashSet<(char, char)> = rounds.iter().flatten().map(unordered).collect();
        let expected: HashSet<(char, char)> = [
            ('A', 'B'),
            ('A', 'C'),
            ('A', 'D'),
            ('B', 'C'),
            ('B', 'D'),
            ('C', 'D'),
        ]
        .into_iter()
        .collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_five_teams_one_idle_per_round() {
        let teams = ['A', 'B', 'C', 'D', 'E'];
        let rounds = circle_rounds(&teams);
        assert_eq!(rounds.len(), 5);

        for round in &rounds {
            assert_eq!(round.len(), 2);
            let playing: HashSet<char> = round.iter().flat_map(|p| [p.home, p.away]).collect();
            assert_eq!(playing.len(), 4);
        }

        // Every team sits out exactly once
        for team in teams {
            let idle = rounds
                .iter()
                .filter(|r| !r.iter().any(|p| p.home == team || p.away == team))
                .count();
            assert_eq!(idle, 1, "{team} should sit out once");
        }

        let pairs: HashSet<(char, char)> = rounds.iter().flatten().map(unordered).collect();
        assert_eq!(pairs.len(), 10);
    }

    #[test]
    fn test_two_teams_single_match() {
        let rounds = circle_rounds(&[1, 2]);
        assert_eq!(rounds, vec![vec![Pairing { home: 1, away: 2 }]]);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(circle_rounds::<u8>(&[]).is_empty());
        assert!(circle_rounds(&[7]).is_empty());
    }

    #[test]
    fn test_counts() {
        assert_eq!(round_count(0), 0);
        assert_eq!(round_count(1), 0);
        assert_eq!(round_count(4), 3);
        assert_eq!(round_count(5), 5);
        assert_eq!(match_count(1), 0);
        assert_eq!(match_count(4), 6);
        assert_eq!(match_count(5), 10);
    }

    #[test]
    fn test_first_slot_stays_fixed() {
        let rounds = circle_rounds(&[0, 1, 2, 3, 4, 5]);
        for round in rounds {
            assert_eq!(round[0].home, 0);
        }
    }
}
