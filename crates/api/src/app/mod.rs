//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/token/password wiring shared by handlers
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and their route schemas
//! - `validation.rs`: body and path extractors that apply the route schemas
//! - `errors.rs`: error classification and the JSON error envelope

use std::sync::Arc;

use axum::{Extension, Router, middleware::from_fn_with_state, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use mesto_auth::Hs256Jwt;
use mesto_infra::Store;

use crate::config::{ApiConfig, RouterProfile};
use crate::context::CurrentUser;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod validation;

use validation::RequestValidation;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the black-box tests).
pub fn build_app(config: &ApiConfig, store: Arc<dyn Store>) -> Router {
    let jwt = Arc::new(Hs256Jwt::new(config.jwt_secret.as_bytes()));
    let services = Arc::new(services::AppServices::new(store, jwt.clone(), config.environment));

    let (protected, validation) = match config.profile {
        RouterProfile::Secured => {
            let auth_state = middleware::AuthState {
                jwt,
                cookie_fallback: config.cookie_auth,
            };
            (
                routes::router().layer(from_fn_with_state(auth_state, middleware::require_auth)),
                RequestValidation::Enforced,
            )
        }
        RouterProfile::Simplified { identity } => (
            routes::router().layer(from_fn_with_state(
                CurrentUser::new(identity),
                middleware::fixed_identity,
            )),
            RequestValidation::Skipped,
        ),
    };

    // The protected router owns the fallback, so unknown paths sit behind the same guard.
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .method_not_allowed_fallback(routes::system::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn_with_state(config.environment, middleware::expose_error_detail))
                .layer(Extension(validation))
                .layer(Extension(services)),
        )
}
