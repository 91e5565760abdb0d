use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/post", get(handlers::post_page))
        .route("/contact", post(handlers::contact))
        .route("/api/chat", post(handlers::chat))
        .route("/consent/accept", post(handlers::consent_accept))
        .route("/consent/necessary", post(handlers::consent_necessary))
        .route("/consent/reject", post(handlers::consent_reject))
        .with_state(state)
}
