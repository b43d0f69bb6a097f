//! Team ordering before partitioning.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How teams are ordered before they are split into groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TeamOrdering {
    /// Keep registration order
    #[default]
    Preserve,
    /// Shuffle with a fresh OS-seeded generator on every run
    Random,
    /// Shuffle reproducibly from a fixed seed
    Seeded(u64),
}

impl FromStr for TeamOrdering {
    type Err = String;

    /// Parses `preserve`, `random` or `seed:<u64>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "preserve" | "" => Ok(TeamOrdering::Preserve),
            "random" => Ok(TeamOrdering::Random),
            other => other
                .strip_prefix("seed:")
                .and_then(|seed| seed.parse().ok())
                .map(TeamOrdering::Seeded)
                .ok_or_else(|| format!("expected preserve, random or seed:<u64>, got {other}")),
        }
    }
}

/// Shuffles team lists for group draws
pub struct TeamShuffler {
    rng: Option<StdRng>,
}

impl TeamShuffler {
    /// Build a shuffler for the given ordering
    pub fn new(ordering: TeamOrdering) -> Self {
        let rng = match ordering {
            TeamOrdering::Preserve => None,
            TeamOrdering::Random => Some(StdRng::from_os_rng()),
            TeamOrdering::Seeded(seed) => Some(StdRng::seed_from_u64(seed)),
        };
        Self { rng }
    }

    /// Reorder `items` in place (no-op when order is preserved)
    pub fn apply<T>(&mut self, items: &mut [T]) {
        if let Some(rng) = self.rng.as_mut() {
            items.shuffle(rng);
        }
    }
}
