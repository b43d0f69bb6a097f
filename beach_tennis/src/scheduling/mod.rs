//! Group-stage scheduling.
//!
//! Turns the registered teams of a category into groups and a round-robin
//! fixture list, then replaces whatever group stage the category had before.
//!
//! - [`round_robin`]: circle-method pairing with a bye for odd team counts
//! - [`plan`]: grouping strategies and the pure, storage-free plan
//! - [`shuffle`]: team draw ordering (preserved, random or seeded)
//! - [`manager`]: [`GroupStageScheduler`], which ties the above to the store
//!
//! ## Example
//!
//! ```no_run
//! use beach_tennis::db::InMemoryStore;
//! use beach_tennis::scheduling::{GroupStageScheduler, SchedulerConfig, DEFAULT_GROUP_SIZE};
//! use std::sync::Arc;
//!
//! # async fn example(category_id: uuid::Uuid) {
//! let store = Arc::new(InMemoryStore::new());
//! let scheduler = GroupStageScheduler::with_store(store, SchedulerConfig::default());
//!
//! let outcome = scheduler.run_group_stage(category_id, DEFAULT_GROUP_SIZE).await;
//! println!("{}", outcome.message);
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod manager;
pub mod plan;
pub mod round_robin;
pub mod shuffle;

pub use config::{SchedulerConfig, SchedulerConfigError};
pub use errors::{FailureKind, MIN_TEAMS, SchedulingError, SchedulingResult};
pub use manager::{GroupStageScheduler, ScheduleOutcome};
pub use plan::{
    DEFAULT_GROUP_SIZE, GroupStagePlan, GroupStageWrite, GroupingStrategy, PlannedGroup,
    ScheduleSummary, plan_group_stage,
};
pub use round_robin::{Pairing, circle_rounds};
pub use shuffle::{TeamOrdering, TeamShuffler};
