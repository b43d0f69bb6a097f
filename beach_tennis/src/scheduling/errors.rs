//! Scheduling error types.

use crate::db::timeouts::TimeoutError;
use crate::tournament::models::CategoryId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of teams a group stage needs
pub const MIN_TEAMS: usize = 2;

/// Scheduling errors
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Category does not exist
    #[error("Category not found: {0}")]
    NotFound(CategoryId),

    /// Category exists but its tournament cannot be resolved
    #[error("Data integrity error for category {category_id}: {reason}")]
    DataIntegrity {
        category_id: CategoryId,
        reason: String,
    },

    /// Not enough eligible teams
    #[error("Insufficient teams: need {needed}, have {current}")]
    InsufficientTeams { needed: usize, current: usize },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store operation timed out
    #[error("Store timeout: {0}")]
    Timeout(TimeoutError),

    /// Any other store failure
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

/// Caller-facing category of a failed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    NotFound,
    DataIntegrity,
    InsufficientTeams,
    StoreFailure,
}

impl From<TimeoutError> for SchedulingError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Database(e) => SchedulingError::Database(e),
            timeout @ TimeoutError::Timeout(_) => SchedulingError::Timeout(timeout),
        }
    }
}

impl SchedulingError {
    /// Whether the failure came from the persistence layer
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            SchedulingError::Database(_)
                | SchedulingError::Timeout(_)
                | SchedulingError::StoreFailure(_)
        )
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SchedulingError::NotFound(_) => FailureKind::NotFound,
            SchedulingError::DataIntegrity { .. } => FailureKind::DataIntegrity,
            SchedulingError::InsufficientTeams { .. } => FailureKind::InsufficientTeams,
            SchedulingError::Database(_)
            | SchedulingError::Timeout(_)
            | SchedulingError::StoreFailure(_) => FailureKind::StoreFailure,
        }
    }

    /// Get a client-safe error message that doesn't leak store internals
    pub fn client_message(&self) -> String {
        match self {
            SchedulingError::NotFound(_) => "Category not found.".to_string(),
            SchedulingError::DataIntegrity { .. } => {
                "Category is not linked to a valid tournament.".to_string()
            }
            SchedulingError::InsufficientTeams { needed, .. } => {
                format!("At least {needed} teams are required to generate matches.")
            }
            SchedulingError::Database(_)
            | SchedulingError::Timeout(_)
            | SchedulingError::StoreFailure(_) => {
                "Internal error while generating matches.".to_string()
            }
        }
    }
}

/// Result type for scheduling operations
pub type SchedulingResult<T> = Result<T, SchedulingError>;
