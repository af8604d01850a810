//! Create a zero counter for every (painting, emotion) in the gallery.
//!
//! Usage: cargo run --bin init-emotion-counts
//!
//! Reads the same configuration as the server. Existing counts are kept.

use emotion_votes::config::AppConfig;
use emotion_votes::connect_postgres;
use emotion_votes::seed::{gallery_catalog, load_seed_data};
use env_logger::Builder;
use log::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .init();

    let config = AppConfig::load()?;
    let store = connect_postgres(&config).await?;

    log::info!("Initializing emotion counts...");
    let ready = load_seed_data(&store, &gallery_catalog()).await?;
    log::info!("Done initializing {} emotion counts", ready);

    Ok(())
}
