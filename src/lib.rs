pub mod auth;
pub mod cache;
pub mod config;
pub mod database;
pub mod diary;
pub mod emotion;
pub mod error;
pub mod logging;
pub mod mood;
pub mod sharing;
pub mod upload;

pub use config::Config;
pub use database::{create_pool, create_redis_client, run_migrations};
pub use upload::UploadTracker;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::auth_middleware;
use crate::emotion::EmotionClassifier;

// multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub config: Config,
    pub classifier: Arc<dyn EmotionClassifier>,
    pub uploads: UploadTracker,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/register", post(auth::login::register))
        .route("/login", post(auth::login::login));

    // protected routes (authentication required)
    let protected_routes = Router::new()
        .route("/me", get(auth::login::get_me))
        .route("/users", get(auth::login::list_users))
        .route(
            "/diary",
            post(diary::handlers::create_or_update_diary)
                .get(diary::handlers::get_diary)
                .delete(diary::handlers::delete_diary),
        )
        .route("/diary/shared-users", get(sharing::handlers::get_shared_users))
        .route("/diary/share", post(sharing::handlers::share_diary))
        .route("/mood/timeline", get(mood::handlers::get_timeline))
        .route("/mood/index", get(mood::handlers::get_mood_index))
        .route(
            "/upload",
            post(upload::handlers::upload_diary).layer(DefaultBodyLimit::max(
                state.config.upload_max_bytes + MULTIPART_OVERHEAD_BYTES,
            )),
        )
        .route(
            "/upload/progress/{id}",
            get(upload::handlers::get_upload_progress),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "Mood Diary API - v0.1.0"
}
