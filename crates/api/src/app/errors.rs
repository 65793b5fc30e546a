use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crewdesk_auth::AuthError;

/// Map an auth-core error onto the API error shape.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::CredentialMismatch => json_error(
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            err.to_string(),
        ),
        AuthError::WeakPassword(issues) => weak_password(issues),
        AuthError::EmailTaken => json_error(StatusCode::CONFLICT, "EMAIL_TAKEN", err.to_string()),
        AuthError::TokenMalformed | AuthError::TokenExpired => {
            json_error(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", err.to_string())
        }
        AuthError::NoTokenProvided | AuthError::MalformedHeader => {
            json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
        }
        AuthError::InsufficientRole(_) => {
            json_error(StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string())
        }
        AuthError::EmptyPassword => {
            json_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
        }
        AuthError::MissingConfiguration(_) | AuthError::Crypto(_) => {
            tracing::error!(error = %err, "auth operation failed");
            internal_error()
        }
    }
}

pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "BAD_REQUEST", rejection.body_text())
}

pub fn weak_password(issues: Vec<String>) -> axum::response::Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        axum::Json(json!({
            "error": {
                "code": "WEAK_PASSWORD",
                "message": "password does not meet requirements",
                "issues": issues,
            }
        })),
    )
        .into_response()
}

pub fn internal_error() -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL",
        "internal server error",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": {
                "code": code,
                "message": message.into(),
            }
        })),
    )
        .into_response()
}
