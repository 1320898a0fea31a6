use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::{delete, get, put},
};

use mesto_core::{CardId, CardView, NewCard, messages};

use crate::app::dto::{CreateCardRequest, MessageResponse};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::app::validation::{IdParam, Payload};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_cards).post(create_card))
        .route("/:cardId", delete(delete_card))
        .route("/:cardId/likes", put(like_card).delete(dislike_card))
}

pub async fn list_cards(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Json<Vec<CardView>>> {
    let cards = services.store.list_cards().await?;
    Ok(Json(services.expand_cards(cards).await?))
}

pub async fn create_card(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
    Payload(body): Payload<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<CardView>)> {
    let present = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(name), Some(link)) = (present(body.name), present(body.link)) else {
        return Err(ApiError::bad_request(messages::CARD_CREATE_INVALID));
    };

    let card = services
        .store
        .insert_card(NewCard {
            name,
            link,
            owner: me.user_id(),
        })
        .await?;

    tracing::info!(card_id = %card.id, owner = %card.owner, "card created");
    Ok((StatusCode::CREATED, Json(services.expand_card(card).await?)))
}

pub async fn delete_card(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
    IdParam(id): IdParam<CardId>,
) -> ApiResult<Json<MessageResponse>> {
    let card = services
        .store
        .find_card(id)
        .await?
        .ok_or_else(|| ApiError::not_found(messages::CARD_NOT_FOUND))?;

    if !card.is_owned_by(me.user_id()) {
        return Err(ApiError::forbidden(messages::CARD_DELETE_FORBIDDEN));
    }

    // A concurrent delete by the owner may have won.
    if !services.store.delete_card(id).await? {
        return Err(ApiError::not_found(messages::CARD_NOT_FOUND));
    }

    tracing::info!(card_id = %id, "card deleted");
    Ok(Json(MessageResponse {
        message: messages::CARD_DELETED,
    }))
}

pub async fn like_card(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
    IdParam(id): IdParam<CardId>,
) -> ApiResult<Json<CardView>> {
    let card = services.store.add_like(id, me.user_id()).await?;
    expanded_or_missing(&services, card).await
}

pub async fn dislike_card(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
    IdParam(id): IdParam<CardId>,
) -> ApiResult<Json<CardView>> {
    let card = services.store.remove_like(id, me.user_id()).await?;
    expanded_or_missing(&services, card).await
}

async fn expanded_or_missing(
    services: &AppServices,
    card: Option<mesto_core::Card>,
) -> ApiResult<Json<CardView>> {
    let card = card.ok_or_else(|| ApiError::not_found(messages::LIKE_CARD_NOT_FOUND))?;
    Ok(Json(services.expand_card(card).await?))
}
