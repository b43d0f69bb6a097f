//! Group partitioning and the records a scheduling run writes.

use super::round_robin::{Pairing, circle_rounds};
use crate::tournament::models::{
    CategoryId, Group, Match, MatchPhase, MatchStatus, Round, SINGLE_GROUP_NAME, TeamId,
    TournamentId,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Default group size passed by the admin surface
pub const DEFAULT_GROUP_SIZE: usize = 4;

/// How teams are split into groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupingStrategy {
    /// Every team in one group
    #[default]
    SingleGroup,
    /// `ceil(teams / n)` groups, teams dealt in turn
    ///
    /// The count drops to `teams / 2` when it would leave a group with a
    /// single team (only possible with `n == 2` and an odd team count), so
    /// every drawn team plays.
    FixedSizeGroups(usize),
}

impl FromStr for GroupingStrategy {
    type Err = String;

    /// Parses `single` or `fixed:<n>` with `n >= 2`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "single" || s.is_empty() {
            return Ok(GroupingStrategy::SingleGroup);
        }

        match s.strip_prefix("fixed:").map(str::parse::<usize>) {
            Some(Ok(size)) if size >= 2 => Ok(GroupingStrategy::FixedSizeGroups(size)),
            Some(Ok(size)) => Err(format!("group size must be at least 2, got {size}")),
            _ => Err(format!("expected single or fixed:<n>, got {s}")),
        }
    }
}

/// A group with its members and pairings, before ids are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedGroup {
    pub name: String,
    pub team_ids: Vec<TeamId>,
    /// Pairings per round, index 0 is round 1
    pub rounds: Vec<Vec<Pairing<TeamId>>>,
}

/// Complete group stage for one category
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupStagePlan {
    pub groups: Vec<PlannedGroup>,
}

impl GroupStagePlan {
    /// Rounds the category needs (the longest group decides)
    pub fn round_count(&self) -> usize {
        self.groups.iter().map(|g| g.rounds.len()).max().unwrap_or(0)
    }

    pub fn match_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.rounds.iter())
            .map(Vec::len)
            .sum()
    }
}

/// Split ordered teams into groups and pair each group with the circle method
pub fn plan_group_stage(teams: &[TeamId], strategy: GroupingStrategy) -> GroupStagePlan {
    let members = match strategy {
        GroupingStrategy::SingleGroup => vec![(SINGLE_GROUP_NAME.to_string(), teams.to_vec())],
        GroupingStrategy::FixedSizeGroups(size) => deal_into_groups(teams, size),
    };

    let groups = members
        .into_iter()
        .map(|(name, team_ids)| PlannedGroup {
            rounds: circle_rounds(&team_ids),
            name,
            team_ids,
        })
        .collect();

    GroupStagePlan { groups }
}

fn deal_into_groups(teams: &[TeamId], size: usize) -> Vec<(String, Vec<TeamId>)> {
    if teams.is_empty() {
        return Vec::new();
    }

    let group_count = teams
        .len()
        .div_ceil(size.max(2))
        .min(teams.len() / 2)
        .max(1);
    let mut groups: Vec<(String, Vec<TeamId>)> = (0..group_count)
        .map(|i| (group_name(i), Vec::with_capacity(size)))
        .collect();

    for (i, team_id) in teams.iter().enumerate() {
        groups[i % group_count].1.push(*team_id);
    }

    groups
}

/// "Grupo A", "Grupo B", ... falling back to numbers past "Z"
fn group_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => format!("Grupo {}", char::from(b'A' + i)),
        _ => format!("Grupo {}", index + 1),
    }
}

/// Records produced by one scheduling run, ready to be stored atomically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStageWrite {
    pub tournament_id: TournamentId,
    pub category_id: CategoryId,
    pub groups: Vec<Group>,
    pub rounds: Vec<Round>,
    pub matches: Vec<Match>,
}

impl GroupStageWrite {
    /// Assign ids and expand a plan into group, round and match records
    pub fn from_plan(
        tournament_id: TournamentId,
        category_id: CategoryId,
        plan: &GroupStagePlan,
    ) -> Self {
        let rounds = (1..=plan.round_count() as u32)
            .map(|number| Round {
                id: Uuid::new_v4(),
                category_id,
                number,
                deadline: None,
            })
            .collect();

        let mut groups = Vec::with_capacity(plan.groups.len());
        let mut matches = Vec::with_capacity(plan.match_count());

        for planned in &plan.groups {
            let group_id = Uuid::new_v4();

            for (index, round) in planned.rounds.iter().enumerate() {
                matches.extend(round.iter().map(|pairing| Match {
                    id: Uuid::new_v4(),
                    tournament_id,
                    category_id,
                    group_id: Some(group_id),
                    team_a: pairing.home,
                    team_b: pairing.away,
                    phase: MatchPhase::Group,
                    status: MatchStatus::Scheduled,
                    round_number: Some(index as u32 + 1),
                }));
            }

            groups.push(Group {
                id: group_id,
                category_id,
                name: planned.name.clone(),
                team_ids: planned.team_ids.clone(),
            });
        }

        matches.sort_by_key(|m| m.round_number);

        Self {
            tournament_id,
            category_id,
            groups,
            rounds,
            matches,
        }
    }

    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            groups_created: self.groups.len(),
            rounds_created: self.rounds.len(),
            matches_created: self.matches.len(),
        }
    }
}

/// Counts reported after a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub groups_created: usize,
    pub rounds_created: usize,
    pub matches_created: usize,
}
