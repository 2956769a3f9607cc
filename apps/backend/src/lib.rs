pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let state = AppState { db: Arc::new(db) };
    let app = router(state).layer(TraceLayer::new_for_http());

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the full API router
pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        // User routes
        .route("/api/users/me", get(routes::users::me))
        // Study set routes
        .route("/api/sets", get(routes::sets::list).post(routes::sets::create))
        .route("/api/sets/mine", get(routes::sets::list_mine))
        .route(
            "/api/sets/:id",
            get(routes::sets::get)
                .put(routes::sets::update)
                .delete(routes::sets::delete),
        )
        .route("/api/sets/:id/import", post(routes::sets::import))
        .route("/api/sets/:id/export", get(routes::sets::export))
        // Progress routes
        .route("/api/sets/:id/progress", get(routes::progress::for_set))
        .route("/api/sets/:id/progress/reset", post(routes::progress::reset))
        .route(
            "/api/sets/:id/progress/initialize",
            post(routes::progress::initialize),
        )
        .route("/api/progress", get(routes::progress::overall))
        .route("/api/progress/answer", post(routes::progress::answer))
        .route("/api/progress/mark", post(routes::progress::mark))
        // Study mode routes
        .route("/api/sets/:id/test", post(routes::study::test))
        .route("/api/sets/:id/match", get(routes::study::match_board))
        // Test result routes
        .route(
            "/api/test-results",
            get(routes::test_results::history).post(routes::test_results::save),
        )
        .route("/api/test-results/stats", get(routes::test_results::stats))
        .route(
            "/api/test-results/:id",
            get(routes::test_results::get).delete(routes::test_results::delete),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/users/register", post(routes::users::register))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
