//! Request validation extractors.
//!
//! Whether route schemas run is decided per router by a [`RequestValidation`] extension, so the
//! handlers are shared by both profiles.

use std::str::FromStr;

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use mesto_core::{CardId, CastError, SchemaError, UserId, messages};

use crate::app::errors::ApiError;

/// Route-level schema for a request body.
pub trait Schema {
    fn validate(&self) -> Result<(), SchemaError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestValidation {
    #[default]
    Enforced,
    Skipped,
}

impl RequestValidation {
    fn of(extensions: &axum::http::Extensions) -> Self {
        extensions.get::<Self>().copied().unwrap_or_default()
    }
}

/// JSON body that passed its route schema.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Schema + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let validation = RequestValidation::of(req.extensions());

        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(malformed_body)?;

        if validation == RequestValidation::Enforced {
            body.validate()?;
        }
        Ok(Payload(body))
    }
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    SchemaError::single("body", rejection.body_text()).into()
}

/// Identifier types accepted as a single path parameter.
pub trait PathId: FromStr<Err = CastError> + Send {
    /// Message for a malformed value when route schemas are enforced.
    const INVALID: &'static str;
}

impl PathId for UserId {
    const INVALID: &'static str = messages::INVALID_USER_ID;
}

impl PathId for CardId {
    const INVALID: &'static str = messages::INVALID_CARD_ID;
}

/// The route's single identifier parameter.
///
/// A malformed value is rejected with the dedicated message when route schemas are enforced,
/// and as a cast failure otherwise.
#[derive(Debug)]
pub struct IdParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for IdParam<T>
where
    T: PathId,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("path extraction failed: {}", e.body_text())))?;

        match raw.parse::<T>() {
            Ok(id) => Ok(IdParam(id)),
            Err(_) if RequestValidation::of(&parts.extensions) == RequestValidation::Enforced => {
                Err(ApiError::bad_request(T::INVALID))
            }
            Err(cast) => Err(cast.into()),
        }
    }
}
