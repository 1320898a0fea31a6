use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use mesto_auth::JwtValidator;
use mesto_core::messages;

use crate::app::errors::{ApiError, ErrorDetail, json_error_with_detail};
use crate::config::Environment;
use crate::context::CurrentUser;

/// Name of the session cookie set at login.
pub const AUTH_COOKIE: &str = "jwt";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    /// Fall back to the [`AUTH_COOKIE`] cookie when there is no `Authorization` header.
    pub cookie_fallback: bool,
}

pub async fn require_auth(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(req.headers(), state.cookie_fallback)?;
    let user_id = state.jwt.validate(token, Utc::now())?;

    req.extensions_mut().insert(CurrentUser::new(user_id));

    Ok(next.run(req).await)
}

/// Act as a fixed user without looking at credentials.
pub async fn fixed_identity(State(user): State<CurrentUser>, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Outside production, fold [`ErrorDetail`] into the error body.
pub async fn expose_error_detail(
    State(environment): State<Environment>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if environment.is_production() {
        return response;
    }
    json_error_with_detail(response.status(), messages::INTERNAL, &detail)
}

fn extract_token(headers: &HeaderMap, cookie_fallback: bool) -> Result<&str, ApiError> {
    match headers.get(header::AUTHORIZATION) {
        Some(value) => extract_bearer(value),
        None if cookie_fallback => cookie_value(headers, AUTH_COOKIE).ok_or_else(auth_required),
        None => Err(auth_required()),
    }
}

fn extract_bearer(header: &HeaderValue) -> Result<&str, ApiError> {
    let header = header.to_str().map_err(|_| auth_required())?;

    let token = header.strip_prefix("Bearer ").ok_or_else(auth_required)?.trim();
    if token.is_empty() {
        return Err(auth_required());
    }

    Ok(token)
}

fn cookie_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

fn auth_required() -> ApiError {
    ApiError::unauthorized(messages::AUTH_REQUIRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_header_is_required_without_cookie_fallback() {
        let h = headers(&[(header::AUTHORIZATION, "Bearer abc.def")]);
        assert_eq!(extract_token(&h, false).unwrap(), "abc.def");

        assert!(extract_token(&headers(&[]), false).is_err());
        assert!(extract_token(&headers(&[(header::AUTHORIZATION, "Basic abc")]), false).is_err());
        assert!(extract_token(&headers(&[(header::AUTHORIZATION, "Bearer   ")]), false).is_err());
    }

    #[test]
    fn cookie_is_used_only_when_the_header_is_absent() {
        let h = headers(&[(header::COOKIE, "theme=dark; jwt=tok.en.sig")]);
        assert_eq!(extract_token(&h, true).unwrap(), "tok.en.sig");
        assert!(extract_token(&h, false).is_err());

        let both = headers(&[
            (header::AUTHORIZATION, "Token nope"),
            (header::COOKIE, "jwt=tok.en.sig"),
        ]);
        assert!(extract_token(&both, true).is_err());
    }
}
