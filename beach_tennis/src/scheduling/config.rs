//! Scheduler configuration.

use super::{plan::GroupingStrategy, shuffle::TeamOrdering};
use crate::tournament::models::RegistrationStatus;

const ELIGIBLE_STATUSES_VAR: &str = "SCHEDULER_ELIGIBLE_STATUSES";
const GROUPING_VAR: &str = "SCHEDULER_GROUPING";
const SHUFFLE_VAR: &str = "SCHEDULER_SHUFFLE";

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchedulerConfig {
    /// Registration statuses allowed into the draw (`None` admits every team)
    pub eligible_statuses: Option<Vec<RegistrationStatus>>,

    /// Group partitioning policy
    pub strategy: GroupingStrategy,

    /// Team ordering applied before partitioning
    pub ordering: TeamOrdering,
}

/// A scheduler setting that could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl SchedulerConfig {
    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `SCHEDULER_ELIGIBLE_STATUSES`: comma-separated statuses, e.g. `APPROVED,PAID` (default: all)
    /// - `SCHEDULER_GROUPING`: `single` or `fixed:<n>` (default: `single`)
    /// - `SCHEDULER_SHUFFLE`: `preserve`, `random` or `seed:<u64>` (default: `preserve`)
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerConfigError::Invalid` if a variable is present but
    /// cannot be parsed, or if the result fails [`SchedulerConfig::validate`].
    pub fn from_env() -> Result<Self, SchedulerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key/value source, e.g. a `.env` map
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SchedulerConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value_of = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = value_of(ELIGIBLE_STATUSES_VAR) {
            config.eligible_statuses = parse_statuses(&value).map_err(|reason| {
                SchedulerConfigError::Invalid {
                    var: ELIGIBLE_STATUSES_VAR,
                    reason,
                }
            })?;
        }

        if let Some(value) = value_of(GROUPING_VAR) {
            config.strategy = value
                .parse()
                .map_err(|reason| SchedulerConfigError::Invalid {
                    var: GROUPING_VAR,
                    reason,
                })?;
        }

        if let Some(value) = value_of(SHUFFLE_VAR) {
            config.ordering = value
                .parse()
                .map_err(|reason| SchedulerConfigError::Invalid {
                    var: SHUFFLE_VAR,
                    reason,
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings under which no run could ever succeed
    pub fn validate(&self) -> Result<(), SchedulerConfigError> {
        if let GroupingStrategy::FixedSizeGroups(size) = self.strategy
            && size < 2
        {
            return Err(SchedulerConfigError::Invalid {
                var: GROUPING_VAR,
                reason: "Groups need at least 2 teams".to_string(),
            });
        }

        if self.eligible_statuses.as_ref().is_some_and(Vec::is_empty) {
            return Err(SchedulerConfigError::Invalid {
                var: ELIGIBLE_STATUSES_VAR,
                reason: "At least one status must be eligible".to_string(),
            });
        }

        Ok(())
    }

    /// Restrict the draw to the given statuses
    pub fn with_eligible_statuses(mut self, statuses: &[RegistrationStatus]) -> Self {
        self.eligible_statuses = Some(statuses.to_vec());
        self
    }

    pub fn with_strategy(mut self, strategy: GroupingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_ordering(mut self, ordering: TeamOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Whether a registration with this status takes part in the draw
    pub fn is_eligible(&self, status: RegistrationStatus) -> bool {
        self.eligible_statuses
            .as_ref()
            .is_none_or(|allowed| allowed.contains(&status))
    }
}

/// Parse a comma-separated status list; an empty or `*`/`all` list admits everyone
///
/// A list made only of separators (e.g. `","`) names no status and is rejected.
pub fn parse_statuses(value: &str) -> Result<Option<Vec<RegistrationStatus>>, String> {
    let value = value.trim();
    if value.is_empty() || value == "*" || value.eq_ignore_ascii_case("all") {
        return Ok(None);
    }

    let statuses = value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<RegistrationStatus>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;

    if statuses.is_empty() {
        return Err(format!("'{value}' names no registration status"));
    }

    Ok(Some(statuses))
}
