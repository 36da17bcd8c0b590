pub mod config;
pub mod db;
pub mod error;
pub mod quota;
pub mod routes;
pub mod scanner;
pub mod state;
pub mod storage;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/scan", post(routes::scan_handler))
        .route("/api/history/:user_id", get(routes::scan_history))
        .route("/api/health", get(routes::health))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_folder))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
