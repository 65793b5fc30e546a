//! HTTP API: auth surfaces, session endpoints and the router.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod surface;
