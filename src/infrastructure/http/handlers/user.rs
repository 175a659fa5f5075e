//! User HTTP Handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::application::{GetUser, RegisterUser, UserView};
use crate::infrastructure::http::auth::CurrentUser;
use crate::infrastructure::http::dto::{ApiResponse, UserResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
}

/// 注册用户
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .register_user_handler
        .handle(RegisterUser {
            username: req.username,
            email: req.email,
        })
        .await?;

    Ok(Json(ApiResponse::success(UserView::from(user).into())))
}

/// 当前用户
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let view = state
        .get_user_handler
        .handle(GetUser {
            user_id: current.id(),
        })
        .await?;

    Ok(Json(ApiResponse::success(view.into())))
}
