//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、健康探测）
//! - commands: 写操作输入
//! - services: 用户 / 文章实体服务
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod services;

// Re-exports
pub use commands::{CreatePost, CreateUser, UpdatePost, UpdateUser};

pub use error::ApplicationError;

pub use ports::{
    AuthorRecord, DatabaseHealthPort, PostChanges, PostRecord, PostRepositoryPort, PostWithAuthor,
    RepositoryError, Role, UserChanges, UserRecord, UserRepositoryPort,
};

pub use services::{
    AuthorView, PostService, PostView, UserDetail, UserPostSummary, UserService, UserView,
};
