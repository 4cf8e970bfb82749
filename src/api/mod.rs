// HTTP API module
// Axum router over the catalog, vector store manager, and assistant


pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub use state::AppState;

/// Build the API router with all endpoints.
#[inline]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/categories", get(handlers::list_categories))
        .route("/products/:category", get(handlers::list_products))
        .route("/vector-store/rebuild", post(handlers::rebuild))
        .route("/vector-store/search", get(handlers::semantic_search))
        .route("/generate", post(handlers::generate))
        .with_state(state)
}
