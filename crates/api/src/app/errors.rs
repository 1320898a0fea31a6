//! Error normalization: every failure a handler or middleware produces ends up here and is
//! rendered as `{message, errors?}` with the status its kind maps to.
//!
//! Classification order:
//! 1. `App` (status chosen by the handler) -> verbatim message
//! 2. schema violations -> 400 + per-field messages
//! 3. identifier cast failures -> 400
//! 4. unique-key violations -> 409
//! 5. token failures -> 401
//! 6. password hashing failures -> 400
//! 7. everything else -> 500 (debug detail attached, see [`ErrorDetail`])

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use mesto_auth::{PasswordError, TokenError};
use mesto_core::{CastError, SchemaError, messages};
use mesto_infra::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A handler decided the status and the message.
    #[error("{message}")]
    App { status: StatusCode, message: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::App {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::App { .. } => "app",
            Self::Schema(_) | Self::Store(StoreError::Schema(_)) => "validation",
            Self::Cast(_) | Self::Store(StoreError::Cast(_)) => "cast",
            Self::Store(StoreError::Duplicate { .. }) => "duplicate_key",
            Self::Token(TokenError::Signing(_)) => "token_signing",
            Self::Token(_) => "token",
            Self::Password(_) => "password",
            Self::Store(StoreError::Backend(_)) => "store_backend",
            Self::Internal(_) => "internal",
        }
    }

    /// Status, client-facing message, and the per-field list for schema failures.
    fn classify(&self) -> (StatusCode, String, Option<Vec<String>>) {
        match self {
            Self::App { status, message } => (*status, message.clone(), None),
            Self::Schema(e) | Self::Store(StoreError::Schema(e)) => (
                StatusCode::BAD_REQUEST,
                messages::VALIDATION_FAILED.to_string(),
                Some(e.messages()),
            ),
            Self::Cast(e) | Self::Store(StoreError::Cast(e)) => (
                StatusCode::BAD_REQUEST,
                messages::cast_failed(e.path, &e.value),
                None,
            ),
            Self::Store(StoreError::Duplicate { .. }) => {
                (StatusCode::CONFLICT, messages::EMAIL_TAKEN.to_string(), None)
            }
            Self::Token(TokenError::Expired) => {
                (StatusCode::UNAUTHORIZED, messages::TOKEN_EXPIRED.to_string(), None)
            }
            Self::Token(TokenError::MissingIdentity) => (
                StatusCode::UNAUTHORIZED,
                messages::TOKEN_WITHOUT_IDENTITY.to_string(),
                None,
            ),
            Self::Token(TokenError::Signing(_)) => internal(),
            Self::Token(_) => (StatusCode::UNAUTHORIZED, messages::TOKEN_INVALID.to_string(), None),
            Self::Password(_) => (
                StatusCode::BAD_REQUEST,
                messages::PASSWORD_PROCESSING.to_string(),
                None,
            ),
            Self::Store(StoreError::Backend(_)) | Self::Internal(_) => internal(),
        }
    }

    fn detail(&self) -> ErrorDetail {
        let stack = match self {
            Self::Internal(e) | Self::Store(StoreError::Backend(e)) => format!("{e:?}"),
            other => format!("{other:?}"),
        };
        ErrorDetail {
            error: self.to_string(),
            stack,
        }
    }
}

fn internal() -> (StatusCode, String, Option<Vec<String>>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        messages::INTERNAL.to_string(),
        None,
    )
}

/// Debug detail of a 500, carried as a response extension.
///
/// `middleware::expose_error_detail` folds it into the body outside production and drops it
/// otherwise, so handlers never need to know the environment.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub error: String,
    pub stack: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = self.classify();

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), status = status.as_u16(), error = ?self, "request failed");
        } else {
            tracing::warn!(kind = self.kind(), status = status.as_u16(), error = %self, "request rejected");
        }

        let mut response = (
            status,
            Json(ErrorEnvelope {
                message: &message,
                errors: errors.as_deref(),
                stack: None,
                error: None,
            }),
        )
            .into_response();

        if status.is_server_error() {
            response.extensions_mut().insert(self.detail());
        }
        response
    }
}

/// `{message, stack, error}`; used for 500s outside production.
pub fn json_error_with_detail(status: StatusCode, message: &str, detail: &ErrorDetail) -> Response {
    (
        status,
        Json(ErrorEnvelope {
            message,
            errors: None,
            stack: Some(&detail.stack),
            error: Some(&detail.error),
        }),
    )
        .into_response()
}
