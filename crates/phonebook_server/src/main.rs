//! Server entry point.
//!
//! # Responsibility
//! - Parse runtime configuration.
//! - Initialize logging and the database before accepting requests.

use anyhow::Context;
use clap::Parser;
use log::info;
use phonebook_server::{build_router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "phonebook-server")]
#[command(about = "HTTP JSON API for the phonebook contact store")]
struct Args {
    /// SQLite database file. Created and migrated on first start.
    #[arg(long, default_value = "phonebook.db")]
    db: PathBuf,
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,
    /// Log level (trace|debug|info|warn|error). Defaults per build mode.
    #[arg(long)]
    log_level: Option<String>,
    /// Log directory. Defaults to `logs` under the working directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_dir = match args.log_dir {
        Some(dir) => dir,
        None => std::env::current_dir()
            .context("cannot resolve working directory")?
            .join("logs"),
    };
    let log_dir = log_dir
        .to_str()
        .context("log directory must be valid UTF-8")?
        .to_string();
    let level = args
        .log_level
        .unwrap_or_else(|| phonebook_core::default_log_level().to_string());
    phonebook_core::init_logging(&level, &log_dir).map_err(anyhow::Error::msg)?;

    // Schema initialization happens here, once, before the listener exists.
    let conn = phonebook_core::db::open_db(&args.db)
        .with_context(|| format!("failed to open database at `{}`", args.db.display()))?;
    let state = AppState::new(conn);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(
        "event=server_start module=server status=ok bind={} db={}",
        args.bind,
        args.db.display()
    );

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
