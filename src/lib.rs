pub mod api;
pub mod config;
pub mod logic;
pub mod model;
pub mod seed;
pub mod store;

// Export API types
pub use api::handlers::AppState;
pub use api::routes::create_router;

// Export session reconciliation
pub use logic::{compute_deltas, ArtworkView, FlushReport, SessionError, VoteSessionManager};

// Export all model types
pub use model::*;

// Export store types
pub use store::{
    CountStore, HttpVoteStore, MemoryStore, PostgresStore, SessionStateCache, SubmissionStore,
    VoteStore,
};

use crate::config::{AppConfig, StoreBackend};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Load configuration, open the configured vote store and serve the API
pub async fn run_server() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let config = AppConfig::load()?;
    serve_configured(config).await
}

/// Open the vote store named by `config.store.backend` and serve the API
pub async fn serve_configured(config: AppConfig) -> anyhow::Result<()> {
    match config.store.backend {
        StoreBackend::Memory => {
            log::info!("Using in-memory vote store");
            serve(Arc::new(MemoryStore::new()), config).await
        }
        StoreBackend::Postgres => {
            let store = connect_postgres(&config).await?;
            serve(Arc::new(store), config).await
        }
    }
}

/// Connect to PostgreSQL and bring the schema up to date
pub async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PostgresStore> {
    let database_url = config.database_url()?;
    log::info!("Connecting to PostgreSQL...");
    let store = PostgresStore::new(&database_url, config.max_connections()).await?;

    log::info!("Running database migrations...");
    store.migrate().await?;
    Ok(store)
}

/// Serve the emotion API over `store` until the listener fails
pub async fn serve<S: VoteStore + 'static>(store: Arc<S>, config: AppConfig) -> anyhow::Result<()> {
    let catalog = seed::gallery_catalog();

    if config.load_seed_data {
        log::info!("Loading seed data...");
        let ready = seed::load_seed_data(&*store, &catalog).await?;
        log::info!("{} emotion counters ready", ready);
    }

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!("Emotion vote server running on http://{}", bind_address);

    let state = AppState::new(store, catalog, config);
    let app = create_router().with_state(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
