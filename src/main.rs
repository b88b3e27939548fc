use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use intimity_backend::{
    app,
    clock::SystemClock,
    config::Config,
    store::PgStore,
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let state = AppState {
        cycles: store.clone(),
        symptoms: store,
        clock: Arc::new(SystemClock),
    };

    tracing::info!("🧠 Server running at {}", config.bind_addr);

    axum::serve(
        tokio::net::TcpListener::bind(config.bind_addr).await?,
        app(state).into_make_service(),
    )
    .await?;

    Ok(())
}
