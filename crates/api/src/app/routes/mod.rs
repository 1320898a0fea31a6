use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod cards;
pub mod system;
pub mod users;

/// Endpoints that need no identity.
pub fn public_router() -> Router {
    Router::new()
        .route("/signin", post(auth::signin))
        .route("/signup", post(auth::signup))
}

/// Router for everything that acts on behalf of the current user, including the index and the
/// not-found fallback.
///
/// A known path hit with the wrong method is answered like an unknown path.
pub fn router() -> Router {
    Router::new()
        .route("/", get(system::index))
        .nest("/users", users::router())
        .nest("/cards", cards::router())
        .method_not_allowed_fallback(system::not_found)
        .fallback(system::not_found)
}
