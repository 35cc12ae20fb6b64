use std::sync::Arc;
use std::time::Duration;

use reel_match_api::{
    config::Config,
    data,
    routes::{create_router, AppState},
    services::{
        providers::{tmdb::TmdbProvider, MetadataProvider},
        recommendations::RecommendationEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("reel_match_api=info,tower_http=info")
            }),
        )
        .init();

    let dataset = Arc::new(data::load_dataset(
        &config.catalog_path,
        &config.similarity_path,
    )?);

    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.poster_base_url.clone(),
        Duration::from_secs(config.metadata_timeout_secs),
    ));
    tracing::info!(provider = provider.name(), "Metadata provider configured");

    let engine = RecommendationEngine::new(
        Arc::clone(&dataset),
        Arc::clone(&provider),
        config.placeholder_poster_url.clone(),
    );

    let state = Arc::new(AppState { engine, dataset });
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
