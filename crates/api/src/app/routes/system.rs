use axum::{Json, http::StatusCode};
use serde_json::{Value, json};

use mesto_core::messages;

use crate::app::errors::ApiError;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Server is running!",
        "endpoints": {
            "auth": {
                "POST /signin": "Sign in and receive a token",
                "POST /signup": "Create new user",
            },
            "users": {
                "GET /users": "Get all users",
                "GET /users/me": "Get current user",
                "GET /users/:userId": "Get user by ID",
                "PATCH /users/me": "Update user profile",
                "PATCH /users/me/avatar": "Update user avatar",
            },
            "cards": {
                "GET /cards": "Get all cards",
                "POST /cards": "Create new card",
                "DELETE /cards/:cardId": "Delete card by ID",
                "PUT /cards/:cardId/likes": "Like card",
                "DELETE /cards/:cardId/likes": "Dislike card",
            },
        },
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found(messages::ROUTE_NOT_FOUND)
}
