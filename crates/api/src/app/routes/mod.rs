use axum::{Router, routing::get};

pub mod auth;
pub mod pages;
pub mod system;

/// Routes for the auth subsystem. Everything else falls through to
/// [`pages::fallback`].
pub fn router() -> Router {
    Router::new()
        .route("/api/health", get(system::health))
        .nest("/api/auth", auth::router())
}
