pub mod health;

use axum::{routing::get, routing::post, Router};

use crate::compiler::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/worksheets/compile", post(handlers::handle_compile))
        .route(
            "/api/v1/worksheets/compile-file",
            post(handlers::handle_compile_file),
        )
        .route(
            "/api/v1/worksheets/generate",
            post(handlers::handle_generate),
        )
        .with_state(state)
}
