//! Repository trait definitions for testability and dependency injection.
//!
//! The scheduler talks to its collaborators only through these traits. The
//! PostgreSQL implementations live here; [`super::memory`] provides an
//! in-process store with the same semantics.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use std::time::Duration;

use super::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout};
use crate::scheduling::{
    SchedulingError, SchedulingResult,
    plan::{GroupStageWrite, ScheduleSummary},
};
use crate::tournament::models::{
    Category, CategoryId, CategorySchedule, Group, GroupId, Match, MatchPhase, Round, Team,
};

/// Trait for category/tournament lookup
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Find a category and resolve its owning tournament
    async fn get_category(&self, category_id: CategoryId) -> SchedulingResult<Option<Category>>;
}

/// Trait for registration lookup
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// All teams registered to a category, in registration order
    async fn list_teams_for_category(&self, category_id: CategoryId)
    -> SchedulingResult<Vec<Team>>;
}

/// Trait for group-stage persistence
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Atomically discard the category's group stage and store `write` in its place.
    ///
    /// Readers must never observe a partially reset or partially written
    /// schedule, and a failure must leave the previous schedule untouched.
    async fn replace_group_stage(&self, write: &GroupStageWrite)
    -> SchedulingResult<ScheduleSummary>;

    /// Load the stored group stage of a category
    async fn load_schedule(&self, category_id: CategoryId) -> SchedulingResult<CategorySchedule>;
}

/// Default PostgreSQL implementation of `CategoryRepository`
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn get_category(&self, category_id: CategoryId) -> SchedulingResult<Option<Category>> {
        let row = with_default_timeout(
            sqlx::query(
                r#"
                SELECT c.id, c.name, t.id AS tournament_id
                FROM categories c
                LEFT JOIN tournaments t ON t.id = c.tournament_id
                WHERE c.id = $1
                "#,
            )
            .bind(category_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.map(|r| Category {
            id: r.get("id"),
            name: r.get("name"),
            tournament_id: r.get("tournament_id"),
        }))
    }
}

/// Default PostgreSQL implementation of `RegistrationRepository`
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    async fn list_teams_for_category(
        &self,
        category_id: CategoryId,
    ) -> SchedulingResult<Vec<Team>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, category_id, status, created_at
                FROM registrations
                WHERE category_id = $1
                ORDER BY created_at, id
                "#,
            )
            .bind(category_id)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|r| {
                let status: String = r.get("status");
                Ok(Team {
                    id: r.get("id"),
                    category_id: r.get("category_id"),
                    status: status
                        .parse()
                        .map_err(|e| SchedulingError::StoreFailure(format!("{e}")))?,
                    registered_at: r.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
                })
            })
            .collect()
    }
}

/// Default PostgreSQL implementation of `ScheduleRepository`
///
/// The replace runs in one transaction that first takes a transaction-scoped
/// advisory lock keyed on the category, so concurrent runs for the same
/// category (from any process) are serialized.
pub struct PgScheduleRepository {
    pool: PgPool,
    transaction_timeout: Duration,
}

impl PgScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Override the timeout applied to the whole replace transaction
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    async fn replace_in_transaction(&self, write: &GroupStageWrite) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(write.category_id.to_string())
            .execute(&mut *tx)
            .await?;

        reset_group_stage(&mut tx, write.category_id).await?;

        for group in &write.groups {
            insert_group(&mut tx, group).await?;
        }

        for round in &write.rounds {
            sqlx::query(
                "INSERT INTO rounds (id, category_id, number, deadline) VALUES ($1, $2, $3, $4)",
            )
            .bind(round.id)
            .bind(round.category_id)
            .bind(round.number as i32)
            .bind(round.deadline.map(|d| d.naive_utc()))
            .execute(&mut *tx)
            .await?;
        }

        for m in &write.matches {
            insert_match(&mut tx, m).await?;
        }

        tx.commit().await
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn replace_group_stage(
        &self,
        write: &GroupStageWrite,
    ) -> SchedulingResult<ScheduleSummary> {
        // Dropping the transaction on timeout rolls it back
        with_timeout(self.transaction_timeout, self.replace_in_transaction(write)).await?;
        Ok(write.summary())
    }

    async fn load_schedule(&self, category_id: CategoryId) -> SchedulingResult<CategorySchedule> {
        let group_rows = with_default_timeout(
            sqlx::query("SELECT id, category_id, name FROM groups WHERE category_id = $1 ORDER BY name")
                .bind(category_id)
                .fetch_all(&self.pool),
        )
        .await?;

        let group_ids: Vec<GroupId> = group_rows.iter().map(|r| r.get("id")).collect();

        let member_rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT gt.group_id, gt.registration_id
                FROM group_teams gt
                JOIN registrations r ON r.id = gt.registration_id
                WHERE gt.group_id = ANY($1)
                ORDER BY r.created_at, r.id
                "#,
            )
            .bind(&group_ids)
            .fetch_all(&self.pool),
        )
        .await?;

        let groups = group_rows
            .iter()
            .map(|r| {
                let id: GroupId = r.get("id");
                Group {
                    id,
                    category_id: r.get("category_id"),
                    name: r.get("name"),
                    team_ids: member_rows
                        .iter()
                        .filter(|m| m.get::<GroupId, _>("group_id") == id)
                        .map(|m| m.get("registration_id"))
                        .collect(),
                }
            })
            .collect();

        let rounds = with_default_timeout(
            sqlx::query(
                "SELECT id, category_id, number, deadline FROM rounds WHERE category_id = $1 ORDER BY number",
            )
            .bind(category_id)
            .fetch_all(&self.pool),
        )
        .await?
        .iter()
        .map(|r| Round {
            id: r.get("id"),
            category_id: r.get("category_id"),
            number: r.get::<i32, _>("number") as u32,
            deadline: r
                .get::<Option<chrono::NaiveDateTime>, _>("deadline")
                .map(|dt| dt.and_utc()),
        })
        .collect();

        let match_rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT id, tournament_id, category_id, group_id, team1_id, team2_id,
                       phase, status, round
                FROM matches
                WHERE category_id = $1 AND phase = $2
                ORDER BY round NULLS LAST, created_at, id
                "#,
            )
            .bind(category_id)
            .bind(MatchPhase::Group.as_str())
            .fetch_all(&self.pool),
        )
        .await?;

        let matches = match_rows
            .iter()
            .map(match_from_row)
            .collect::<SchedulingResult<Vec<_>>>()?;

        Ok(CategorySchedule {
            groups,
            rounds,
            matches,
        })
    }
}

/// Delete the category's group stage in dependency order
async fn reset_group_stage(
    conn: &mut PgConnection,
    category_id: CategoryId,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM matches WHERE category_id = $1 AND phase = $2")
        .bind(category_id)
        .bind(MatchPhase::Group.as_str())
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM rounds WHERE category_id = $1")
        .bind(category_id)
        .execute(&mut *conn)
        .await?;

    let group_ids: Vec<GroupId> = sqlx::query("SELECT id FROM groups WHERE category_id = $1")
        .bind(category_id)
        .fetch_all(&mut *conn)
        .await?
        .iter()
        .map(|r| r.get("id"))
        .collect();

    for group_id in group_ids {
        sqlx::query("DELETE FROM group_teams WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM matches WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(group_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn insert_group(conn: &mut PgConnection, group: &Group) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO groups (id, category_id, name) VALUES ($1, $2, $3)")
        .bind(group.id)
        .bind(group.category_id)
        .bind(&group.name)
        .execute(&mut *conn)
        .await?;

    for team_id in &group.team_ids {
        sqlx::query("INSERT INTO group_teams (group_id, registration_id) VALUES ($1, $2)")
            .bind(group.id)
            .bind(team_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn insert_match(conn: &mut PgConnection, m: &Match) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO matches (id, tournament_id, category_id, group_id, team1_id, team2_id,
                             phase, status, round)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(m.id)
    .bind(m.tournament_id)
    .bind(m.category_id)
    .bind(m.group_id)
    .bind(m.team_a)
    .bind(m.team_b)
    .bind(m.phase.as_str())
    .bind(m.status.as_str())
    .bind(m.round_number.map(|n| n as i32))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn match_from_row(r: &PgRow) -> SchedulingResult<Match> {
    let phase: String = r.get("phase");
    let status: String = r.get("status");

    Ok(Match {
        id: r.get("id"),
        tournament_id: r.get("tournament_id"),
        category_id: r.get("category_id"),
        group_id: r.get("group_id"),
        team_a: r.get("team1_id"),
        team_b: r.get("team2_id"),
        phase: phase
            .parse()
            .map_err(|e| SchedulingError::StoreFailure(format!("{e}")))?,
        status: status
            .parse()
            .map_err(|e| SchedulingError::StoreFailure(format!("{e}")))?,
        round_number: r.get::<Option<i32>, _>("round").map(|n| n as u32),
    })
}
