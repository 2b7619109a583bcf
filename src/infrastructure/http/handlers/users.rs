//! User HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::{CreateUser, UpdateUser, UserDetail, UserView};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::http::validation::Valid;

/// POST /api/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Valid(command): Valid<CreateUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    let user = state.user_service.create(command).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(user, "User created successfully")),
    ))
}

/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    let users = state.user_service.list().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<UserDetail>>, ApiError> {
    let user = state.user_service.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Valid(command): Valid<UpdateUser>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = state.user_service.update(&id, command).await?;
    Ok(Json(ApiResponse::with_message(user, "User updated successfully")))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.user_service.delete(&id).await?;
    Ok(Json(ApiResponse::empty("User deleted successfully")))
}
