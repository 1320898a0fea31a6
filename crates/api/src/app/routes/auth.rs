use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json,
    extract::Extension,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Duration;

use mesto_core::{NewUser, SchemaError, User, messages, schema};

use crate::app::dto::{SignInRequest, SignInResponse, SignUpRequest};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::app::validation::Payload;
use crate::config::Environment;
use crate::middleware::AUTH_COOKIE;

pub async fn signin(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<SignInRequest>,
) -> ApiResult<Response> {
    // Unknown email and wrong password must be indistinguishable.
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(bad_credentials());
    };
    let Some(credentials) = services.store.find_credentials_by_email(&email).await? else {
        return Err(bad_credentials());
    };
    if !services
        .verify_password(password, credentials.password_hash)
        .await?
    {
        return Err(bad_credentials());
    }

    let user = credentials.user;
    let token = services.issue_token(user.id)?;
    let cookie = session_cookie(&token, services.jwt.ttl(), services.environment)?;

    tracing::info!(user_id = %user.id, "user signed in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            message: messages::LOGIN_OK,
            token,
            user,
        }),
    )
        .into_response())
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Payload(body): Payload<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let email = match body.email {
        Some(email) if schema::is_email(&email) => email,
        _ => return Err(ApiError::bad_request(messages::INVALID_EMAIL)),
    };
    let Some(password) = body.password else {
        return Err(SchemaError::single("password", messages::required("password")).into());
    };

    let password_hash = services.hash_password(password).await?;
    let user = services
        .store
        .insert_user(NewUser {
            name: body.name,
            about: body.about,
            avatar: body.avatar,
            email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

fn bad_credentials() -> ApiError {
    ApiError::unauthorized(messages::BAD_CREDENTIALS)
}

fn session_cookie(token: &str, ttl: Duration, environment: Environment) -> ApiResult<HeaderValue> {
    let mut cookie = format!(
        "{AUTH_COOKIE}={token}; Max-Age={}; Path=/; HttpOnly; SameSite=Strict",
        ttl.num_seconds()
    );
    if environment.is_production() {
        cookie.push_str("; Secure");
    }
    Ok(HeaderValue::from_str(&cookie).context("session cookie is not a valid header value")?)
}
