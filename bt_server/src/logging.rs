//! Structured logging configuration.
//!
//! The library logs through the `log` facade; `init` installs a `tracing`
//! subscriber that also receives those records.

use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Slower scheduling runs are logged at warn level
pub const SLOW_RUN_THRESHOLD: Duration = Duration::from_secs(1);

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var.
///
/// # Example
///
/// ```no_run
/// use bt_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log a finished scheduling request
///
/// # Arguments
///
/// * `request_id` - Correlation id of the HTTP request
/// * `category_id` - Category that was scheduled
/// * `success` - Whether a new group stage was stored
/// * `elapsed` - Time spent in the scheduler
pub fn log_scheduling_run(request_id: &str, category_id: &str, success: bool, elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;

    if elapsed > SLOW_RUN_THRESHOLD {
        tracing::warn!(
            request_id = request_id,
            category_id = category_id,
            success = success,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow group-stage run"
        );
    } else {
        tracing::info!(
            request_id = request_id,
            category_id = category_id,
            success = success,
            duration_ms = duration_ms,
            "Group-stage run completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_scheduling_run() {
        // Just ensure it doesn't panic
        log_scheduling_run("req-1", "cat-1", true, Duration::from_millis(12));
        log_scheduling_run("req-2", "cat-1", false, Duration::from_secs(2));
    }
}
