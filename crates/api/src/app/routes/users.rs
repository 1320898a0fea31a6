use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    routing::{get, patch},
};

use mesto_core::{User, UserId, UserPatch, messages};

use crate::app::dto::{UpdateAvatarRequest, UpdateProfileRequest};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::app::validation::{IdParam, Payload};
use crate::context::CurrentUser;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(current_user).patch(update_profile))
        .route("/me/avatar", patch(update_avatar))
        .route("/:userId", get(get_user))
}

pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(services.store.list_users().await?))
}

pub async fn current_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
) -> ApiResult<Json<User>> {
    find_user(&services, me.user_id()).await
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    IdParam(id): IdParam<UserId>,
) -> ApiResult<Json<User>> {
    find_user(&services, id).await
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
    Payload(body): Payload<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    let patch = UserPatch::profile(body.name, body.about);
    services
        .store
        .update_user(me.user_id(), patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(messages::USER_NOT_FOUND))
}

pub async fn update_avatar(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(me): Extension<CurrentUser>,
    Payload(body): Payload<UpdateAvatarRequest>,
) -> ApiResult<Json<User>> {
    services
        .store
        .update_user(me.user_id(), UserPatch::avatar(body.avatar))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(messages::AVATAR_USER_NOT_FOUND))
}

async fn find_user(services: &AppServices, id: UserId) -> ApiResult<Json<User>> {
    services
        .store
        .find_user(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(messages::USER_NOT_FOUND))
}
