use std::sync::Arc;

use mood_diary::{
    create_pool, create_redis_client, create_router, emotion::HttpEmotionClassifier, logging,
    run_migrations, upload, AppState, Config, UploadTracker,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init();

    let config = Config::from_env()?;

    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;
    info!("Database ready");

    let redis = create_redis_client(&config.redis_url).await?;
    info!("Redis connected");

    let classifier = HttpEmotionClassifier::from_config(&config)?;
    info!(url = %config.classifier_url, "Emotion classifier configured");

    let uploads = UploadTracker::new();
    upload::spawn_sweeper(uploads.clone());

    let address = config.server_address.clone();
    let state = Arc::new(AppState {
        db,
        redis,
        config,
        classifier: Arc::new(classifier),
        uploads,
    });

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Starting server on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
