//! reel-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite catalog, and either serves the JSON API or runs a migration
//! command.
//!
//! ```text
//! reel-server            # same as `serve`
//! reel-server migrate    # apply pending migrations
//! reel-server rollback   # revert the most recent migration
//! reel-server status     # list migrations and when they were applied
//! ```

mod config;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use reel_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Reel catalog server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
  /// Apply pending migrations and serve the API (default).
  Serve,
  /// Apply every pending migration.
  Migrate,
  /// Revert the most recently applied migration.
  Rollback,
  /// Show every migration and whether it has been applied.
  Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = ServerConfig::load(&cli.config)?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg).await,
    Command::Migrate => migrate(cfg).await,
    Command::Rollback => rollback(cfg).await,
    Command::Status => status(cfg).await,
  }
}

async fn connect(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  SqliteStore::connect(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open database at {:?}", cfg.database_path))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = SqliteStore::open(&cfg.database_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.database_path))?;

  let app = axum::Router::new()
    .nest("/api", reel_api::api_router(Arc::new(store)))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn migrate(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = connect(&cfg).await?;
  let applied = store
    .migrator()
    .migrate()
    .await
    .context("migration failed")?;

  if applied.is_empty() {
    println!("Nothing to migrate.");
  } else {
    println!("Applied {} migration(s): {applied:?}", applied.len());
  }
  Ok(())
}

async fn rollback(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = connect(&cfg).await?;
  match store.migrator().rollback().await.context("rollback failed")? {
    Some(version) => println!("Rolled back migration {version}."),
    None => println!("Nothing to roll back."),
  }
  Ok(())
}

async fn status(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = connect(&cfg).await?;
  for m in store.migrator().status().await? {
    let applied = m
      .applied_at
      .map(|at| at.to_rfc3339())
      .unwrap_or_else(|| "pending".into());
    println!("{:>4}  {:<32} {applied}", m.version, m.name);
  }
  Ok(())
}
