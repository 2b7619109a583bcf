//! Application State
//!
//! 启动时一次性构建，通过 `Arc` 在请求间共享

use std::sync::Arc;

use crate::application::{
    DatabaseHealthPort, PostRepositoryPort, PostService, UserRepositoryPort, UserService,
};

/// 应用状态
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub database: Arc<dyn DatabaseHealthPort>,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        post_repo: Arc<dyn PostRepositoryPort>,
        database: Arc<dyn DatabaseHealthPort>,
    ) -> Self {
        Self {
            user_service: UserService::new(user_repo.clone(), post_repo.clone()),
            post_service: PostService::new(post_repo, user_repo),
            database,
        }
    }
}
