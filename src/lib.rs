//! Postboard - 用户与文章 REST API
//!
//! 架构设计: Hexagonal Architecture
//!
//! 应用层 (application/):
//! - Ports: 端口定义（UserRepository, PostRepository, DatabaseHealth）
//! - Commands: 请求命令（创建/更新用户与文章）
//! - Services: UserService, PostService
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API、校验、错误边界
//! - Persistence: SQLite 存储

pub mod application;
pub mod config;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
