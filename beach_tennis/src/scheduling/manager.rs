//! Group-stage scheduler: resolves a category, draws its teams into groups
//! and replaces the stored schedule with a fresh round robin.

use super::{
    config::SchedulerConfig,
    errors::{FailureKind, MIN_TEAMS, SchedulingError, SchedulingResult},
    plan::{GroupStagePlan, GroupStageWrite, GroupingStrategy, ScheduleSummary, plan_group_stage},
    shuffle::TeamShuffler,
};
use crate::db::Database;
use crate::db::repository::{
    CategoryRepository, PgCategoryRepository, PgRegistrationRepository, PgScheduleRepository,
    RegistrationRepository, ScheduleRepository,
};
use crate::tournament::models::{CategoryId, CategorySchedule, TeamId, TournamentId};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

/// Result value handed back to the administrative caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ScheduleSummary>,
    /// Set when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
}

impl ScheduleOutcome {
    pub fn from_result(result: &SchedulingResult<ScheduleSummary>) -> Self {
        match result {
            Ok(summary) => Self {
                success: true,
                message: format!(
                    "{} matches generated in {} group(s) over {} round(s).",
                    summary.matches_created, summary.groups_created, summary.rounds_created
                ),
                summary: Some(*summary),
                error: None,
            },
            Err(e) => Self {
                success: false,
                message: e.client_message(),
                summary: None,
                error: Some(e.kind()),
            },
        }
    }
}

/// Group-stage scheduler
#[derive(Clone)]
pub struct GroupStageScheduler {
    categories: Arc<dyn CategoryRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    config: SchedulerConfig,

    /// One lock per category so runs for the same category never interleave
    category_locks: Arc<RwLock<HashMap<CategoryId, Arc<Mutex<()>>>>>,
}

impl GroupStageScheduler {
    /// Create a scheduler over explicit collaborators
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            categories,
            registrations,
            schedules,
            config,
            category_locks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a scheduler over a store implementing every repository
    pub fn with_store<S>(store: Arc<S>, config: SchedulerConfig) -> Self
    where
        S: CategoryRepository + RegistrationRepository + ScheduleRepository + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// Create a scheduler backed by PostgreSQL
    ///
    /// Replace transactions are bounded by the database's configured
    /// transaction timeout.
    pub fn postgres(database: &Database, config: SchedulerConfig) -> Self {
        let pool = database.pool().clone();
        Self::new(
            Arc::new(PgCategoryRepository::new(pool.clone())),
            Arc::new(PgRegistrationRepository::new(pool.clone())),
            Arc::new(
                PgScheduleRepository::new(pool)
                    .with_transaction_timeout(database.transaction_timeout()),
            ),
            config,
        )
    }

    /// Generate the group stage of a category using the configured strategy.
    ///
    /// `group_size` is accepted for callers that pass the admin default; only
    /// [`GroupingStrategy`] decides how teams are split.
    ///
    /// # Errors
    ///
    /// * `SchedulingError::NotFound` - Category does not exist
    /// * `SchedulingError::DataIntegrity` - Category has no resolvable tournament
    /// * `SchedulingError::InsufficientTeams` - Fewer than two eligible teams
    /// * Store errors - Nothing was changed
    pub async fn schedule_group_stage(
        &self,
        category_id: CategoryId,
        group_size: usize,
    ) -> SchedulingResult<ScheduleSummary> {
        log::debug!(
            "Scheduling category {} (group size {}, strategy {:?})",
            category_id,
            group_size,
            self.config.strategy
        );
        self.schedule_with_strategy(category_id, self.config.strategy)
            .await
    }

    /// Generate the group stage of a category with an explicit strategy
    pub async fn schedule_with_strategy(
        &self,
        category_id: CategoryId,
        strategy: GroupingStrategy,
    ) -> SchedulingResult<ScheduleSummary> {
        let lock = self.category_lock(category_id).await;
        let _guard = lock.lock().await;

        let (tournament_id, plan) = self.prepare(category_id, strategy).await?;
        let write = GroupStageWrite::from_plan(tournament_id, category_id, &plan);
        let summary = self.schedules.replace_group_stage(&write).await?;

        log::info!(
            "Generated group stage for category {}: {} groups, {} rounds, {} matches",
            category_id,
            summary.groups_created,
            summary.rounds_created,
            summary.matches_created
        );

        Ok(summary)
    }

    /// Compute the group stage without storing anything
    pub async fn preview_group_stage(
        &self,
        category_id: CategoryId,
    ) -> SchedulingResult<GroupStagePlan> {
        let (_, plan) = self.prepare(category_id, self.config.strategy).await?;
        Ok(plan)
    }

    /// Run the scheduler and convert any failure into a caller-facing outcome
    pub async fn run_group_stage(&self, category_id: CategoryId, group_size: usize) -> ScheduleOutcome {
        let result = self.schedule_group_stage(category_id, group_size).await;

        if let Err(e) = &result {
            if e.is_store_failure() {
                log::error!("Failed to generate matches for category {}: {}", category_id, e);
            } else {
                log::warn!("Refused to generate matches for category {}: {}", category_id, e);
            }
        }

        ScheduleOutcome::from_result(&result)
    }

    /// Load the stored group stage of an existing category
    pub async fn load_schedule(&self, category_id: CategoryId) -> SchedulingResult<CategorySchedule> {
        self.categories
            .get_category(category_id)
            .await?
            .ok_or(SchedulingError::NotFound(category_id))?;

        self.schedules.load_schedule(category_id).await
    }

    /// Resolve the category and draw its eligible teams; performs no writes
    async fn prepare(
        &self,
        category_id: CategoryId,
        strategy: GroupingStrategy,
    ) -> SchedulingResult<(TournamentId, GroupStagePlan)> {
        let category = self
            .categories
            .get_category(category_id)
            .await?
            .ok_or(SchedulingError::NotFound(category_id))?;

        let tournament_id = category
            .tournament_id
            .ok_or_else(|| SchedulingError::DataIntegrity {
                category_id,
                reason: "owning tournament could not be resolved".to_string(),
            })?;

        let mut team_ids: Vec<TeamId> = self
            .registrations
            .list_teams_for_category(category_id)
            .await?
            .into_iter()
            .filter(|team| self.config.is_eligible(team.status))
            .map(|team| team.id)
            .collect();

        if team_ids.len() < MIN_TEAMS {
            return Err(SchedulingError::InsufficientTeams {
                needed: MIN_TEAMS,
                current: team_ids.len(),
            });
        }

        TeamShuffler::new(self.config.ordering).apply(&mut team_ids);

        Ok((tournament_id, plan_group_stage(&team_ids, strategy)))
    }

    async fn category_lock(&self, category_id: CategoryId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.category_locks.read().await.get(&category_id) {
            return lock.clone();
        }

        self.category_locks
            .write()
            .await
            .entry(category_id)
            .or_default()
            .clone()
    }
}
