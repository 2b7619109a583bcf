//! Post Service

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{now, parse_id};
use crate::application::commands::{CreatePost, UpdatePost};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AuthorRecord, PostChanges, PostRecord, PostRepositoryPort, PostWithAuthor,
    RepositoryError, UserRepositoryPort,
};

const POST_NOT_FOUND: &str = "Post not found";
const AUTHOR_NOT_FOUND: &str = "Author not found";

// ============================================================================
// Views
// ============================================================================

/// 作者摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorView {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

impl From<AuthorRecord> for AuthorView {
    fn from(record: AuthorRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
        }
    }
}

/// 文章及作者摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorView,
}

impl From<PostWithAuthor> for PostView {
    fn from(PostWithAuthor { post, author }: PostWithAuthor) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            published: post.published,
            author_id: post.author_id,
            created_at: post.created_at,
            updated_at: post.updated_at,
            author: AuthorView::from(author),
        }
    }
}

// ============================================================================
// Service
// ============================================================================

pub struct PostService {
    post_repo: Arc<dyn PostRepositoryPort>,
    user_repo: Arc<dyn UserRepositoryPort>,
}

impl PostService {
    pub fn new(
        post_repo: Arc<dyn PostRepositoryPort>,
        user_repo: Arc<dyn UserRepositoryPort>,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
        }
    }

    pub async fn create(&self, command: CreatePost) -> Result<PostView, ApplicationError> {
        let author_id =
            parse_id(&command.author_id).ok_or_else(|| ApplicationError::not_found(AUTHOR_NOT_FOUND))?;
        let author = self
            .user_repo
            .find_by_id(author_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(AUTHOR_NOT_FOUND))?;

        let now = now();
        let post = PostRecord {
            id: Uuid::new_v4(),
            title: command.title,
            content: command.content,
            published: command.published.unwrap_or(false),
            author_id: author.id,
            created_at: now,
            updated_at: now,
        };

        // 检查与插入之间作者可能已被删除，由外键约束兜底
        self.post_repo.insert(&post).await.map_err(|e| match e {
            RepositoryError::MissingReference(_) => ApplicationError::not_found(AUTHOR_NOT_FOUND),
            other => other.into(),
        })?;

        tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");

        Ok(PostView::from(PostWithAuthor {
            post,
            author: AuthorRecord {
                id: author.id,
                name: author.name,
                email: author.email,
            },
        }))
    }

    pub async fn list(&self) -> Result<Vec<PostView>, ApplicationError> {
        let posts = self.post_repo.find_all_with_author().await?;
        Ok(posts.into_iter().map(PostView::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> Result<PostView, ApplicationError> {
        let id = parse_id(id).ok_or_else(|| ApplicationError::not_found(POST_NOT_FOUND))?;

        self.post_repo
            .find_with_author(id)
            .await?
            .map(PostView::from)
            .ok_or_else(|| ApplicationError::not_found(POST_NOT_FOUND))
    }

    pub async fn update(&self, id: &str, command: UpdatePost) -> Result<PostView, ApplicationError> {
        let existing = self.find_existing(id).await?;

        let changes = PostChanges::from(command);
        self.post_repo.update(existing.id, &changes, now()).await?;

        tracing::info!(post_id = %existing.id, "Post updated");

        // 更新与回读之间文章可能已被删除
        self.post_repo
            .find_with_author(existing.id)
            .await?
            .map(PostView::from)
            .ok_or_else(|| ApplicationError::not_found(POST_NOT_FOUND))
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApplicationError> {
        let existing = self.find_existing(id).await?;

        self.post_repo.delete(existing.id).await?;

        tracing::info!(post_id = %existing.id, title = %existing.title, "Post deleted");

        Ok(())
    }

    async fn find_existing(&self, id: &str) -> Result<PostRecord, ApplicationError> {
        let Some(id) = parse_id(id) else {
            return Err(ApplicationError::not_found(POST_NOT_FOUND));
        };

        self.post_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(POST_NOT_FOUND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::commands::CreateUser;
    use crate::application::services::{UserService, UserView};
    use crate::infrastructure::persistence::sqlite::{
        test_pool, SqlitePostRepository, SqliteUserRepository,
    };

    struct Fixture {
        users: UserService,
        posts: PostService,
        author: UserView,
    }

    async fn fixture() -> Fixture {
        let pool = test_pool().await;
        let user_repo: Arc<dyn UserRepositoryPort> =
            Arc::new(SqliteUserRepository::new(pool.clone()));
        let post_repo: Arc<dyn PostRepositoryPort> = Arc::new(SqlitePostRepository::new(pool));
        let users = UserService::new(user_repo.clone(), post_repo.clone());
        let posts = PostService::new(post_repo, user_repo);

        let author = users
            .create(CreateUser {
                email: "author@x.com".to_string(),
                name: Some("Ann".to_string()),
                password: "secret1".to_string(),
                role: None,
            })
            .await
            .unwrap();

        Fixture {
            users,
            posts,
            author,
        }
    }

    fn new_post(title: &str, author: &UserView) -> CreatePost {
        CreatePost {
            title: title.to_string(),
            content: Some("Some content".to_string()),
            published: None,
            author_id: author.id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_nests_author_summary() {
        let f = fixture().await;

        let post = f.posts.create(new_post("Hi There", &f.author)).await.unwrap();
        assert_eq!(post.title, "Hi There");
        assert!(!post.published);
        assert_eq!(post.author_id, f.author.id);
        assert_eq!(
            post.author,
            AuthorView {
                id: f.author.id,
                name: Some("Ann".to_string()),
                email: "author@x.com".to_string(),
            }
        );

        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["authorId"], f.author.id.to_string());
        assert!(json["author"].get("password").is_none());
        assert!(json["author"].get("role").is_none());
    }

    #[tokio::test]
    async fn test_create_with_unknown_author_writes_nothing() {
        let f = fixture().await;

        for author_id in [Uuid::new_v4().to_string(), "<unknown>".to_string()] {
            let err = f
                .posts
                .create(CreatePost {
                    author_id,
                    ..new_post("Hi There", &f.author)
                })
                .await
                .unwrap_err();
            match err {
                ApplicationError::NotFound(msg) => assert_eq!(msg, AUTHOR_NOT_FOUND),
                other => panic!("unexpected {other:?}"),
            }
        }

        assert!(f.posts.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_unknown_is_not_found() {
        let f = fixture().await;
        let err = f.posts.get_by_id(&Uuid::new_v4().to_string()).await.unwrap_err();
        match err {
            ApplicationError::NotFound(msg) => assert_eq!(msg, POST_NOT_FOUND),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_title_preserves_other_fields() {
        let f = fixture().await;
        let created = f
            .posts
            .create(CreatePost {
                published: Some(true),
                ..new_post("Original", &f.author)
            })
            .await
            .unwrap();

        let updated = f
            .posts
            .update(
                &created.id.to_string(),
                UpdatePost {
                    title: Some("Renamed".to_string()),
                    ..UpdatePost::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.content, created.content);
        assert_eq!(updated.published, created.published);
        assert_eq!(updated.author_id, created.author_id);
        assert_eq!(updated.created_at, created.created_at);

        let fetched = f.posts.get_by_id(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let f = fixture().await;
        let err = f
            .posts
            .update(&Uuid::new_v4().to_string(), UpdatePost::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_stable() {
        let f = fixture().await;
        for title in ["One", "Two", "Three"] {
            f.posts.create(new_post(title, &f.author)).await.unwrap();
        }

        let first = f.posts.list().await.unwrap();
        let second = f.posts.list().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert!(first.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert!(first.iter().all(|p| p.author.id == f.author.id));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let f = fixture().await;
        let post = f.posts.create(new_post("Short lived", &f.author)).await.unwrap();

        f.posts.delete(&post.id.to_string()).await.unwrap();

        let err = f.posts.get_by_id(&post.id.to_string()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
        let err = f.posts.delete(&post.id.to_string()).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));

        let detail = f.users.get_by_id(&f.author.id.to_string()).await.unwrap();
        assert!(detail.posts.is_empty());
    }
}
