//! User Service

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{now, parse_id};
use crate::application::commands::{CreateUser, UpdateUser};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    PostRecord, PostRepositoryPort, RepositoryError, Role, UserChanges, UserRecord,
    UserRepositoryPort,
};

const USER_NOT_FOUND: &str = "User not found";
const EMAIL_TAKEN_ON_CREATE: &str = "User with this email already exists";
const EMAIL_TAKEN_ON_UPDATE: &str = "Email already in use";

// ============================================================================
// Views
// ============================================================================

/// 对外的用户投影，不含密码
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserView {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            role: record.role,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// 用户名下的文章摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPostSummary {
    pub id: Uuid,
    pub title: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PostRecord> for UserPostSummary {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            published: record.published,
            created_at: record.created_at,
        }
    }
}

/// 用户详情：投影 + 文章列表
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: UserView,
    pub posts: Vec<UserPostSummary>,
}

// ============================================================================
// Service
// ============================================================================

pub struct UserService {
    user_repo: Arc<dyn UserRepositoryPort>,
    post_repo: Arc<dyn PostRepositoryPort>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        post_repo: Arc<dyn PostRepositoryPort>,
    ) -> Self {
        Self {
            user_repo,
            post_repo,
        }
    }

    pub async fn create(&self, command: CreateUser) -> Result<UserView, ApplicationError> {
        if self.user_repo.find_by_email(&command.email).await?.is_some() {
            return Err(ApplicationError::conflict(EMAIL_TAKEN_ON_CREATE));
        }

        let now = now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: command.email,
            name: command.name,
            password: command.password,
            role: command.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        // 检查与插入之间另一个请求可能抢先注册同一邮箱，由 UNIQUE 约束兜底
        self.user_repo.insert(&user).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => ApplicationError::conflict(EMAIL_TAKEN_ON_CREATE),
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, role = user.role.as_str(), "User created");

        Ok(UserView::from(user))
    }

    pub async fn list(&self) -> Result<Vec<UserView>, ApplicationError> {
        let users = self.user_repo.find_all().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<UserDetail, ApplicationError> {
        let user = self.find_existing(id).await?;
        let posts = self.post_repo.find_by_author(user.id).await?;

        Ok(UserDetail {
            user: UserView::from(user),
            posts: posts.into_iter().map(UserPostSummary::from).collect(),
        })
    }

    pub async fn update(&self, id: &str, command: UpdateUser) -> Result<UserView, ApplicationError> {
        let existing = self.find_existing(id).await?;

        if let Some(email) = command.email.as_deref() {
            if email != existing.email {
                let taken = self.user_repo.find_by_email(email).await?;
                if taken.is_some_and(|other| other.id != existing.id) {
                    return Err(ApplicationError::conflict(EMAIL_TAKEN_ON_UPDATE));
                }
            }
        }

        let changes = UserChanges::from(command);
        let updated = self
            .user_repo
            .update(existing.id, &changes, now())
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(_) => ApplicationError::conflict(EMAIL_TAKEN_ON_UPDATE),
                RepositoryError::NotFound(_) => ApplicationError::not_found(USER_NOT_FOUND),
                other => other.into(),
            })?;

        tracing::info!(user_id = %updated.id, "User updated");

        Ok(UserView::from(updated))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApplicationError> {
        let existing = self.find_existing(id).await?;

        self.user_repo.delete(existing.id).await?;

        tracing::info!(user_id = %existing.id, email = %existing.email, "User deleted");

        Ok(())
    }

    async fn find_existing(&self, id: &str) -> Result<UserRecord, ApplicationError> {
        let Some(id) = parse_id(id) else {
            return Err(ApplicationError::not_found(USER_NOT_FOUND));
        };

        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(USER_NOT_FOUND))
    }
}
