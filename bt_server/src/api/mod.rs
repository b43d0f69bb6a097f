//! HTTP API for the group-stage scheduler.
//!
//! # Modules
//!
//! - [`schedules`]: Generate, preview and read group stages
//! - [`request_id`]: Request correlation middleware
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                                                   - Health check
//! POST /api/v1/admin/categories/{category_id}/group-stage        - Generate group stage
//! GET  /api/v1/admin/categories/{category_id}/group-stage/preview - Preview draw
//! GET  /api/v1/categories/{category_id}/schedule                 - Stored schedule
//! ```
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use bt_server::api::{create_router, AppState};
//! use beach_tennis::{GroupStageScheduler, SchedulerConfig, db::InMemoryStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let state = AppState {
//!     scheduler: Arc::new(GroupStageScheduler::with_store(store, SchedulerConfig::default())),
//!     database: None,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod request_id;
pub mod schedules;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use beach_tennis::{GroupStageScheduler, db::Database};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// - `scheduler`: Runs and reads group stages
/// - `database`: Pool used for health checks; `None` with the in-memory store
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<GroupStageScheduler>,
    pub database: Option<Database>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let admin_routes = Router::new()
        .route(
            "/categories/{category_id}/group-stage",
            post(schedules::generate_group_stage),
        )
        .route(
            "/categories/{category_id}/group-stage/preview",
            get(schedules::preview_group_stage),
        );

    Router::new()
        .route(
            "/categories/{category_id}/schedule",
            get(schedules::get_schedule),
        )
        .nest("/admin", admin_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store is reachable, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","store":"postgres","database":true,"timestamp":"2026-03-02T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (store, healthy) = match &state.database {
        Some(db) => ("postgres", db.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store,
        "database": healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
