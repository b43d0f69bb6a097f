//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use beach_tennis::{
    db::DatabaseConfig,
    scheduling::{SchedulerConfig, SchedulerConfigError},
};
use std::net::{Ipv4Addr, SocketAddr};

/// Default bind address when neither `--bind` nor `SERVER_BIND` is given
pub const DEFAULT_BIND: SocketAddr = SocketAddr::new(
    std::net::IpAddr::V4(Ipv4Addr::LOCALHOST),
    8080,
);

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration (unused with the in-memory store)
    pub database: DatabaseConfig,
    /// Scheduler policy
    pub scheduler: SchedulerConfig,
    /// Serve from the in-memory store instead of PostgreSQL
    pub in_memory: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `in_memory` - Whether `--in-memory` was passed
    ///
    /// # Errors
    ///
    /// Returns error if a variable is present but cannot be parsed; the
    /// `SCHEDULER_*` variables are read by [`SchedulerConfig::from_env`]
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        in_memory: bool,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => match std::env::var("SERVER_BIND") {
                Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "SERVER_BIND".to_string(),
                    reason: format!("'{value}' is not an IP:PORT address"),
                })?,
                Err(_) => DEFAULT_BIND,
            },
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let scheduler = SchedulerConfig::from_env()?;

        Ok(ServerConfig {
            bind,
            database,
            scheduler,
            in_memory,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.in_memory {
            if self.database.max_connections == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_MAX_CONNECTIONS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }

            if self.database.min_connections > self.database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed max connections ({})",
                        self.database.max_connections
                    ),
                });
            }

            if self.database.transaction_timeout_secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "DB_TRANSACTION_TIMEOUT_SECS".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        self.scheduler.validate()?;

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error(transparent)]
    Scheduler(#[from] SchedulerConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use beach_tennis::{scheduling::GroupingStrategy, tournament::RegistrationStatus};

    fn config() -> ServerConfig {
        ServerConfig {
            bind: DEFAULT_BIND,
            database: DatabaseConfig::development(),
            scheduler: SchedulerConfig::default(),
            in_memory: false,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "SCHEDULER_GROUPING".to_string(),
            reason: "expected single or fixed:<n>".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SCHEDULER_GROUPING"));
        assert!(msg.contains("fixed:<n>"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
        assert_eq!(DEFAULT_BIND.port(), 8080);
    }

    #[test]
    fn test_validation_min_connections_above_max() {
        let mut config = config();
        config.database.min_connections = 20;
        config.database.max_connections = 5;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_MIN_CONNECTIONS"));

        // Pool settings are irrelevant without a database
        config.in_memory = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_tiny_groups() {
        let mut config = config();
        config.scheduler.strategy = GroupingStrategy::FixedSizeGroups(1);
        assert!(matches!(config.validate(), Err(ConfigError::Scheduler(_))));
    }

    #[test]
    fn test_validation_zero_transaction_timeout() {
        let mut config = config();
        config.database.transaction_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref var, .. } if var == "DB_TRANSACTION_TIMEOUT_SECS"));
    }

    #[test]
    fn test_validation_empty_eligible_set() {
        let mut config = config();
        config.scheduler = SchedulerConfig::default().with_eligible_statuses(&[]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SCHEDULER_ELIGIBLE_STATUSES"));

        config.scheduler =
            SchedulerConfig::default().with_eligible_statuses(&[RegistrationStatus::Paid]);
        assert!(config.validate().is_ok());
    }
}
