//! # Beach Tennis
//!
//! Group-stage scheduling for beach-tennis tournaments.
//!
//! Each tournament category gathers registered doubles teams. Generating the
//! group stage discards any previous groups, rounds and group-phase matches of
//! the category and stores a fresh round robin in their place, so running it
//! twice leaves exactly one schedule behind.
//!
//! ## Core Modules
//!
//! - [`scheduling`]: Round-robin pairing, grouping strategies and the scheduler
//! - [`db`]: Repository traits with PostgreSQL and in-memory implementations
//! - [`tournament`]: Categories, teams, groups, rounds and matches
//!
//! ## Example
//!
//! ```
//! use beach_tennis::scheduling::{GroupingStrategy, plan_group_stage};
//! use uuid::Uuid;
//!
//! let teams: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
//! let plan = plan_group_stage(&teams, GroupingStrategy::SingleGroup);
//!
//! assert_eq!(plan.round_count(), 3);
//! assert_eq!(plan.match_count(), 6);
//! ```

/// Storage: connection pool, repositories and the in-memory store.
pub mod db;

/// Group-stage generation.
pub mod scheduling;
pub use scheduling::{
    FailureKind, GroupStageScheduler, GroupingStrategy, ScheduleOutcome, ScheduleSummary,
    SchedulerConfig, SchedulerConfigError, SchedulingError, SchedulingResult, TeamOrdering,
};

/// Tournament entities.
pub mod tournament;
