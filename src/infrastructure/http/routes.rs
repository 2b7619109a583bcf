//! HTTP Routes
//!
//! API Endpoints:
//! - /api/health          GET     健康检查（数据库不可用时 503）
//! - /api/users           POST    创建用户
//! - /api/users           GET     用户列表
//! - /api/users/:id       GET     用户详情（含文章摘要）
//! - /api/users/:id       PUT     更新用户
//! - /api/users/:id       DELETE  删除用户
//! - /api/posts           POST    创建文章
//! - /api/posts           GET     文章列表
//! - /api/posts/:id       GET     文章详情
//! - /api/posts/:id       PUT     更新文章
//! - /api/posts/:id       DELETE  删除文章

use axum::{routing::get, Router};
use std::sync::Arc;

use super::handlers;
use super::middleware::route_not_found;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .fallback(route_not_found)
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/users", user_routes())
        .nest("/posts", post_routes())
}

/// User 路由
fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
}

/// Post 路由
fn post_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::list_posts).post(handlers::create_post))
        .route(
            "/:id",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
}
