//! Process entry point (SPEC_FULL §4.11 ambient stack). Loads configuration,
//! initializes structured logging, runs pending migrations, wires
//! [`state::AppState`], and serves the router with graceful shutdown.
//! Bootstrap shape grounded in `zvault_server::main` (config-then-log-then-state,
//! `axum::serve(..).with_graceful_shutdown(..)`).

mod config;
mod identity;
mod routes;
mod state;

use clap::Parser;
use config::{AppConfig, LogFormat};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Most configuration is read from `KANBAN_*` environment variables
/// (spec §6); this flag only covers what an operator needs at process
/// launch rather than at request time.
#[derive(Debug, Parser)]
#[command(name = "kanban-server", about = "Kanban platform kernel HTTP server")]
struct Cli {
    /// Skip running pending database migrations on startup.
    #[arg(long, env = "KANBAN_SKIP_MIGRATIONS")]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone()));
    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt().with_env_filter(env_filter).json().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_env_filter(env_filter).pretty().init();
        }
    }

    info!(bind_addr = %config.bind_addr, "kanban-server starting");

    let conn = Database::connect(&config.database_url).await?;
    if cli.skip_migrations {
        info!("skipping migrations (--skip-migrations)");
    } else {
        kanban_db::Migrator::up(&conn, None).await?;
        info!("migrations applied");
    }

    let repo = kanban_db::KanbanRepo::new(Arc::new(conn));
    let state = AppState::build(&config, repo);
    let app = routes::router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "kanban-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("kanban-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, draining in-flight requests");
}
