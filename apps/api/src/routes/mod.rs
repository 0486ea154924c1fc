pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::caption::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::liveness_handler))
        .route("/health", get(health::health_handler))
        .route("/caption", post(handlers::handle_caption))
        .with_state(state)
}
