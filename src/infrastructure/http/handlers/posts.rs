//! Post HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::{CreatePost, PostView, UpdatePost};
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::http::validation::Valid;

/// POST /api/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    Valid(command): Valid<CreatePost>,
) -> Result<(StatusCode, Json<ApiResponse<PostView>>), ApiError> {
    let post = state.post_service.create(command).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(post, "Post created successfully")),
    ))
}

/// GET /api/posts
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PostView>>>, ApiError> {
    let posts = state.post_service.list().await?;
    Ok(Json(ApiResponse::success(posts)))
}

/// GET /api/posts/:id
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    let post = state.post_service.get_by_id(&id).await?;
    Ok(Json(ApiResponse::success(post)))
}

/// PUT /api/posts/:id
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Valid(command): Valid<UpdatePost>,
) -> Result<Json<ApiResponse<PostView>>, ApiError> {
    let post = state.post_service.update(&id, command).await?;
    Ok(Json(ApiResponse::with_message(post, "Post updated successfully")))
}

/// DELETE /api/posts/:id
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.post_service.delete(&id).await?;
    Ok(Json(ApiResponse::empty("Post deleted successfully")))
}
