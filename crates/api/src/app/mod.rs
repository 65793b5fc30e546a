//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared services (tokens, password hashing, credential store)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: the `{ "error": { "code", "message" } }` response shape

use std::sync::Arc;

use axum::{Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    with_auth(
        routes::router().fallback(routes::pages::fallback),
        services,
    )
}

/// Put `router` behind the auth surfaces and hand it the services.
///
/// Every request, including fallbacks, passes the auth middleware first.
pub fn with_auth(router: Router, services: AppServices) -> Router {
    let auth_state = services.auth_state();

    router
        .layer(Extension(Arc::new(services)))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
}
