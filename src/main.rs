use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

mod config;
mod db;
mod error;
mod rating;
mod transfer;
mod web;

use config::Config;
use db::Database;
use web::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;
    let rules = config.rules()?;
    info!(
        "Scoring: uma {:?}, return score {}, table total {}",
        rules.uma, rules.return_score, rules.table_total
    );

    let db = Database::open(&config.database_path)?;
    info!("Database opened: {}", config.database_path);

    let season = config.season_window();
    info!(
        "Season window: {:02}.{}-{} ('{}' archives)",
        season.year % 100,
        season.from_month,
        season.to_month,
        season.marker
    );

    let state = AppState {
        db,
        rules,
        club_name: config.club_name.clone(),
        static_dir: PathBuf::from(&config.static_dir),
        season,
    };
    let app = web::router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("{} ledger listening on http://{}", config.club_name, addr);
    axum::serve(listener, app).await?;

    Ok(())
}
