//! Command-line interface.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::http::WillsHttpServer;
use crate::adapters::sqlite::{
    all_embedded_migrations, create_pool, Migrator, SqliteAcknowledgmentRepository,
    SqliteCheckInRepository, SqliteCommitmentRepository, SqliteReviewRepository,
    SqliteWillRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{LoggingNotifier, SystemClock};
use crate::services::{CheckInService, LifecycleScheduler, ReviewGate};

#[derive(Parser)]
#[command(name = "willcircle", about = "Commitment accountability engine", version)]
pub struct Cli {
    /// Path to a config file (defaults to .willcircle/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API and the lifecycle scheduler
    Serve,
    /// Run one lifecycle sweep and exit
    Tick,
    /// Apply pending schema migrations and exit
    Migrate,
}

struct Wiring {
    scheduler: Arc<LifecycleScheduler>,
    check_ins: Arc<CheckInService>,
    gate: Arc<ReviewGate>,
}

async fn wire(config: &Config) -> Result<Wiring> {
    let pool = create_pool(&config.database)
        .await
        .context("Failed to open database")?;

    let migrator = Migrator::new(pool.clone());
    let applied = migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;
    if applied > 0 {
        tracing::info!(applied, "schema migrations applied");
    }

    let wills = Arc::new(SqliteWillRepository::new(pool.clone()));
    let check_in_repo = Arc::new(SqliteCheckInRepository::new(pool.clone()));
    let commitments = Arc::new(SqliteCommitmentRepository::new(pool.clone()));
    let reviews = Arc::new(SqliteReviewRepository::new(pool.clone()));
    let acknowledgments = Arc::new(SqliteAcknowledgmentRepository::new(pool));
    let clock = Arc::new(SystemClock);

    let scheduler = Arc::new(LifecycleScheduler::new(
        wills.clone(),
        commitments.clone(),
        check_in_repo.clone(),
        reviews.clone(),
        Arc::new(LoggingNotifier),
        clock.clone(),
        Duration::from_secs(config.scheduler.tick_interval_secs),
    ));
    let check_ins = Arc::new(CheckInService::new(
        wills.clone(),
        check_in_repo,
        clock,
    ));
    let gate = Arc::new(ReviewGate::new(wills, commitments, reviews, acknowledgments));

    Ok(Wiring { scheduler, check_ins, gate })
}

/// Run the HTTP API with the lifecycle scheduler ticking alongside.
pub async fn serve(config: Config) -> Result<()> {
    let wiring = wire(&config).await?;

    let scheduler = wiring.scheduler.clone();
    let handle = wiring.scheduler.start();

    let server = WillsHttpServer::new(wiring.check_ins, wiring.gate, config.http.clone());
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown signal received");
    };
    server
        .serve_with_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {e}"))?;

    scheduler.stop();
    handle.abort();
    Ok(())
}

/// Run a single lifecycle sweep and report the outcome.
pub async fn tick(config: Config) -> Result<()> {
    let wiring = wire(&config).await?;
    let summary = wiring.scheduler.tick().await;
    tracing::info!(
        evaluated = summary.evaluated,
        transitioned = summary.transitioned,
        errors = summary.errors,
        "lifecycle tick complete"
    );
    if summary.errors > 0 {
        anyhow::bail!("{} will(s) failed evaluation", summary.errors);
    }
    Ok(())
}

/// Apply pending migrations.
pub async fn migrate(config: Config) -> Result<()> {
    let pool = create_pool(&config.database)
        .await
        .context("Failed to open database")?;
    let migrator = Migrator::new(pool);
    let applied = migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .context("Failed to run migrations")?;
    tracing::info!(applied, "migrations complete");
    Ok(())
}
