use anyhow::Context;

use crewdesk_api::app::{AppServices, build_app};
use crewdesk_api::config::ServerConfig;
use crewdesk_api::surface::SessionCookie;
use crewdesk_auth::AuthConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crewdesk_observability::init();

    let auth = AuthConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "refusing to start without a valid auth configuration");
    })?;
    let server = ServerConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "invalid server configuration");
    })?;

    let services = AppServices::in_memory(&auth)?
        .with_session_cookie(SessionCookie::new(server.secure_cookies));
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        token_lifetime = %auth.token_lifetime,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
