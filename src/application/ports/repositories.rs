//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 引用的实体不存在（外键约束）
    #[error("Missing reference: {0}")]
    MissingReference(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// User Repository
// ============================================================================

/// 用户角色
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub const ALL: &'static [&'static str] = &["USER", "ADMIN"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

}

impl FromStr for Role {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(RepositoryError::SerializationError(format!(
                "unknown role: {}",
                other
            ))),
        }
    }
}

/// 用户实体（用于持久化）
///
/// `password` 原样保存，不做哈希
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 用户部分更新，`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 插入新用户
    async fn insert(&self, user: &UserRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepositoryError>;

    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// 获取所有用户（created_at 倒序）
    async fn find_all(&self) -> Result<Vec<UserRecord>, RepositoryError>;

    /// 只写入 `changes` 中给出的字段，返回更新后的记录
    async fn update(
        &self,
        id: Uuid,
        changes: &UserChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<UserRecord, RepositoryError>;

    /// 删除用户（其文章由外键级联删除）
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

// ============================================================================
// Post Repository
// ============================================================================

/// 文章实体（用于持久化）
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 作者摘要
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

/// 文章及其作者
#[derive(Debug, Clone)]
pub struct PostWithAuthor {
    pub post: PostRecord,
    pub author: AuthorRecord,
}

/// 文章部分更新，`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

/// Post Repository Port
#[async_trait]
pub trait PostRepositoryPort: Send + Sync {
    /// 插入新文章
    async fn insert(&self, post: &PostRecord) -> Result<(), RepositoryError>;

    /// 根据 ID 查找文章
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepositoryError>;

    /// 根据 ID 查找文章并带出作者
    async fn find_with_author(&self, id: Uuid)
        -> Result<Option<PostWithAuthor>, RepositoryError>;

    /// 获取所有文章及作者（created_at 倒序）
    async fn find_all_with_author(&self) -> Result<Vec<PostWithAuthor>, RepositoryError>;

    /// 获取某个用户的所有文章（created_at 倒序）
    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepositoryError>;

    /// 只写入 `changes` 中给出的字段
    async fn update(
        &self,
        id: Uuid,
        changes: &PostChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// 删除文章
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}

// ============================================================================
// Health
// ============================================================================

/// 数据库连通性探测
#[async_trait]
pub trait DatabaseHealthPort: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_strings() {
        for name in Role::ALL {
            let role: Role = name.parse().unwrap();
            assert_eq!(role.as_str(), *name);
        }
        assert!(matches!(
            "user".parse::<Role>(),
            Err(RepositoryError::SerializationError(_))
        ));
    }

    #[test]
    fn test_role_defaults_to_user() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
    }
}
