//! Session endpoints: register, login, logout, who-am-i and refresh.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crewdesk_auth::{AuthError, CredentialRecord, authenticate, normalize_email};
use crewdesk_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/refresh", post(refresh))
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let email = normalize_email(&body.email);
    if !dto::is_plausible_email(&email) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST",
            "email address is not valid",
        );
    }
    if let Err(e) = services.credentials.ensure_strong(&body.password) {
        return errors::auth_error_to_response(e);
    }
    if services.store.lookup_by_email(&email).is_some() {
        return errors::auth_error_to_response(AuthError::EmailTaken);
    }

    let credentials = services.credentials.clone();
    let password = body.password;
    let password_hash = match blocking(move || credentials.hash_password(&password)).await {
        Ok(hash) => hash,
        Err(response) => return response,
    };

    let record = CredentialRecord {
        id: UserId::new(),
        email,
        password_hash,
        role: body.role,
        business_type: body.business_type,
    };
    if let Err(e) = services.store.insert(record.clone()) {
        return errors::auth_error_to_response(e);
    }

    tracing::info!(user_id = %record.id, role = %record.role, "account registered");
    session_response(&services, &record, StatusCode::CREATED)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let checker = Arc::clone(&services);
    let outcome = blocking(move || {
        authenticate(
            checker.store.as_ref(),
            &checker.credentials,
            &body.email,
            &body.password,
        )
    })
    .await;

    match outcome {
        Ok(record) => {
            tracing::info!(user_id = %record.id, "login succeeded");
            session_response(&services, &record, StatusCode::OK)
        }
        Err(response) => {
            if response.status() == StatusCode::UNAUTHORIZED {
                tracing::warn!("login rejected");
            }
            response
        }
    }
}

/// Drop the browser session. Issued tokens stay valid until they expire.
pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> Response {
    (
        [(header::SET_COOKIE, services.session_cookie.clear())],
        Json(serde_json::json!({ "status": "logged_out" })),
    )
        .into_response()
}

pub async fn me(session: SessionContext) -> Response {
    Json(session).into_response()
}

/// Issue a fresh token from the stored account, picking up role or email
/// changes made since the current token was signed.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    session: SessionContext,
) -> Response {
    let Some(record) = services.store.lookup_by_id(&session.user_id()) else {
        tracing::debug!(user_id = %session.user_id(), "refresh for unknown account");
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "INVALID_TOKEN",
            "account no longer exists",
        );
    };

    session_response(&services, &record, StatusCode::OK)
}

fn session_response(services: &AppServices, record: &CredentialRecord, status: StatusCode) -> Response {
    let issued = match services.tokens.issue(record.identity()) {
        Ok(issued) => issued,
        Err(e) => return errors::auth_error_to_response(e),
    };

    let cookie = services
        .session_cookie
        .issue(&issued.token, services.tokens.lifetime().as_secs());

    (
        status,
        [(header::SET_COOKIE, cookie)],
        Json(dto::SessionResponse {
            token: issued.token,
            expires_in: issued.expires_in,
            user: record.profile(),
        }),
    )
        .into_response()
}

/// Run password hashing or verification off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, Response>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(errors::auth_error_to_response(e)),
        Err(e) => {
            tracing::error!(error = %e, "blocking auth task failed");
            Err(errors::internal_error())
        }
    }
}
