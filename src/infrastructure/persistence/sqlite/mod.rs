//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod post_repo;
mod user_repo;

pub use database::{create_pool, run_migrations, DatabaseConfig, DbPool, SqliteHealthProbe};
pub use post_repo::*;
pub use user_repo::*;

/// 已迁移的内存数据库，供测试使用
#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}
