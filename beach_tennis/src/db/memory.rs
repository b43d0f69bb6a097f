//! In-process store implementing every repository trait.
//!
//! A replace is staged on a copy of the category's state and swapped in
//! under a single write lock, so readers see either the old or the new
//! group stage and a failure leaves the old one in place.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::repository::{CategoryRepository, RegistrationRepository, ScheduleRepository};
use crate::scheduling::{
    SchedulingError, SchedulingResult,
    plan::{GroupStageWrite, ScheduleSummary},
};
use crate::tournament::models::{
    Category, CategoryId, CategorySchedule, Group, Match, MatchPhase, Round, Team,
};

/// Step of a replace at which an injected failure fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// While deleting the previous group stage
    Reset,
    /// After groups and rounds are staged, while inserting matches
    InsertMatches,
}

#[derive(Debug, Default, Clone)]
struct MemoryState {
    categories: Vec<Category>,
    teams: Vec<Team>,
    groups: Vec<Group>,
    rounds: Vec<Round>,
    matches: Vec<Match>,
}

impl MemoryState {
    /// Reset cascade: group-phase matches, rounds, then each group's
    /// memberships, matches and the group itself
    fn reset_group_stage(&mut self, category_id: CategoryId) {
        self.matches
            .retain(|m| !(m.category_id == category_id && m.phase == MatchPhase::Group));
        self.rounds.retain(|r| r.category_id != category_id);

        let group_ids: Vec<_> = self
            .groups
            .iter()
            .filter(|g| g.category_id == category_id)
            .map(|g| g.id)
            .collect();

        for group_id in group_ids {
            self.matches.retain(|m| m.group_id != Some(group_id));
            self.groups.retain(|g| g.id != group_id);
        }
    }
}

/// In-memory store
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
    failure: RwLock<Option<FailurePoint>>,
    replace_count: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite a category
    pub async fn insert_category(&self, category: Category) {
        let mut state = self.state.write().await;
        state.categories.retain(|c| c.id != category.id);
        state.categories.push(category);
    }

    /// Register a team (appended, so registration order is insertion order)
    pub async fn insert_team(&self, team: Team) {
        self.state.write().await.teams.push(team);
    }

    /// Store a match directly, e.g. a knockout match created elsewhere
    pub async fn insert_match(&self, m: Match) {
        self.state.write().await.matches.push(m);
    }

    /// Make every following replace fail at `point` until cleared
    pub async fn fail_at(&self, point: Option<FailurePoint>) {
        *self.failure.write().await = point;
    }

    /// Number of successful replaces
    pub fn replace_count(&self) -> usize {
        self.replace_count.load(Ordering::SeqCst)
    }

    /// Every stored match of a category, any phase
    pub async fn all_matches(&self, category_id: CategoryId) -> Vec<Match> {
        self.state
            .read()
            .await
            .matches
            .iter()
            .filter(|m| m.category_id == category_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn get_category(&self, category_id: CategoryId) -> SchedulingResult<Option<Category>> {
        Ok(self
            .state
            .read()
            .await
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .cloned())
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryStore {
    async fn list_teams_for_category(
        &self,
        category_id: CategoryId,
    ) -> SchedulingResult<Vec<Team>> {
        Ok(self
            .state
            .read()
            .await
            .teams
            .iter()
            .filter(|t| t.category_id == category_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryStore {
    async fn replace_group_stage(
        &self,
        write: &GroupStageWrite,
    ) -> SchedulingResult<ScheduleSummary> {
        let failure = *self.failure.read().await;
        let mut state = self.state.write().await;
        let mut staged = state.clone();

        if failure == Some(FailurePoint::Reset) {
            return Err(SchedulingError::StoreFailure(
                "injected failure during reset".to_string(),
            ));
        }
        staged.reset_group_stage(write.category_id);

        staged.groups.extend(write.groups.iter().cloned());
        staged.rounds.extend(write.rounds.iter().cloned());

        if failure == Some(FailurePoint::InsertMatches) {
            return Err(SchedulingError::StoreFailure(
                "injected failure while inserting matches".to_string(),
            ));
        }
        staged.matches.extend(write.matches.iter().cloned());

        *state = staged;
        self.replace_count.fetch_add(1, Ordering::SeqCst);

        Ok(write.summary())
    }

    async fn load_schedule(&self, category_id: CategoryId) -> SchedulingResult<CategorySchedule> {
        let state = self.state.read().await;

        let groups = state
            .groups
            .iter()
            .filter(|g| g.category_id == category_id)
            .cloned()
            .collect();

        let mut rounds: Vec<Round> = state
            .rounds
            .iter()
            .filter(|r| r.category_id == category_id)
            .cloned()
            .collect();
        rounds.sort_by_key(|r| r.number);

        let mut matches: Vec<Match> = state
            .matches
            .iter()
            .filter(|m| m.category_id == category_id && m.phase == MatchPhase::Group)
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.round_number);

        Ok(CategorySchedule {
            groups,
            rounds,
            matches,
        })
    }
}
