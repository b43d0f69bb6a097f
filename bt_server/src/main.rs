//! Group-stage scheduling server.
//!
//! Serves the scheduler over HTTP, backed by PostgreSQL or, with
//! `--in-memory`, by a process-local store seeded with a demo category.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use beach_tennis::{
    GroupStageScheduler,
    db::{Database, InMemoryStore},
    tournament::{Category, RegistrationStatus, Team},
};
use bt_server::{api, config::ServerConfig, logging};
use log::info;
use pico_args::Arguments;
use uuid::Uuid;

const HELP: &str = "\
Run the beach-tennis group-stage scheduling server

USAGE:
  bt_server [OPTIONS]

OPTIONS:
  --bind        IP:PORT    Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url      URL        Database connection string  [default: env DATABASE_URL]
  --demo-teams  N          Teams in the demo category (with --in-memory)  [default: 8]

FLAGS:
  --in-memory              Use a process-local store instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL                 PostgreSQL connection string
  DB_MAX_CONNECTIONS           Pool size and other DB_* pool settings
  DB_TRANSACTION_TIMEOUT_SECS  Bound on one group-stage replace  [default: 10]
  SCHEDULER_ELIGIBLE_STATUSES  Statuses drawn into groups (e.g., APPROVED,PAID) [default: all]
  SCHEDULER_GROUPING           single | fixed:<n>  [default: single]
  SCHEDULER_SHUFFLE            preserve | random | seed:<u64>  [default: preserve]
  RUST_LOG                     Log filter  [default: info,sqlx=warn,hyper=warn]
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    demo_teams: usize,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        demo_teams: pargs.opt_value_from_str("--demo-teams")?.unwrap_or(8),
        in_memory: pargs.contains("--in-memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.in_memory)?;
    config.validate()?;

    info!(
        "Scheduler policy: strategy {:?}, ordering {:?}, eligible {:?}",
        config.scheduler.strategy, config.scheduler.ordering, config.scheduler.eligible_statuses
    );

    let state = if config.in_memory {
        let store = Arc::new(InMemoryStore::new());
        let category_id = seed_demo_category(&store, args.demo_teams).await;
        info!(
            "Using in-memory store; demo category {} has {} teams",
            category_id, args.demo_teams
        );

        api::AppState {
            scheduler: Arc::new(GroupStageScheduler::with_store(store, config.scheduler)),
            database: None,
        }
    } else {
        info!("Connecting to database");
        let db = Database::new(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.apply_schema()
            .await
            .context("Failed to apply group-stage schema")?;
        info!("Database connected successfully");

        api::AppState {
            scheduler: Arc::new(GroupStageScheduler::postgres(&db, config.scheduler)),
            database: Some(db),
        }
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Insert a demo tournament category with `team_count` approved teams
async fn seed_demo_category(store: &InMemoryStore, team_count: usize) -> Uuid {
    let category_id = Uuid::new_v4();
    store
        .insert_category(Category {
            id: category_id,
            name: "Demo Mista".to_string(),
            tournament_id: Some(Uuid::new_v4()),
        })
        .await;

    for _ in 0..team_count {
        store
            .insert_team(Team::new(category_id).with_status(RegistrationStatus::Approved))
            .await;
    }

    category_id
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
