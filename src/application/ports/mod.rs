//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod repositories;

pub use repositories::{
    AuthorRecord, DatabaseHealthPort, PostChanges, PostRecord, PostRepositoryPort, PostWithAuthor,
    RepositoryError, Role, UserChanges, UserRecord, UserRepositoryPort,
};
