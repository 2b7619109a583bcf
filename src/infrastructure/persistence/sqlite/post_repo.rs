//! SQLite Post Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::database::{format_timestamp, map_sqlx_error, parse_timestamp, parse_uuid};
use super::DbPool;
use crate::application::ports::{
    AuthorRecord, PostChanges, PostRecord, PostRepositoryPort, PostWithAuthor, RepositoryError,
};

const POST_COLUMNS: &str = "id, title, content, published, author_id, created_at, updated_at";

const POST_WITH_AUTHOR_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.published, p.author_id, p.created_at, p.updated_at,
           u.name AS author_name, u.email AS author_email
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

/// SQLite Post Repository
pub struct SqlitePostRepository {
    pool: DbPool,
}

impl SqlitePostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: String,
    title: String,
    content: Option<String>,
    published: bool,
    author_id: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PostRow> for PostRecord {
    type Error = RepositoryError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(PostRecord {
            id: parse_uuid(&row.id)?,
            title: row.title,
            content: row.content,
            published: row.published,
            author_id: parse_uuid(&row.author_id)?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct PostWithAuthorRow {
    #[sqlx(flatten)]
    post: PostRow,
    author_name: Option<String>,
    author_email: String,
}

impl TryFrom<PostWithAuthorRow> for PostWithAuthor {
    type Error = RepositoryError;

    fn try_from(row: PostWithAuthorRow) -> Result<Self, Self::Error> {
        let post = PostRecord::try_from(row.post)?;
        Ok(PostWithAuthor {
            author: AuthorRecord {
                id: post.author_id,
                name: row.author_name,
                email: row.author_email,
            },
            post,
        })
    }
}

#[async_trait]
impl PostRepositoryPort for SqlitePostRepository {
    async fn insert(&self, post: &PostRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, content, published, author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(post.id.to_string())
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.published)
        .bind(post.author_id.to_string())
        .bind(format_timestamp(&post.created_at))
        .bind(format_timestamp(&post.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PostRecord>, RepositoryError> {
        let row: Option<PostRow> =
            sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(PostRecord::try_from).transpose()
    }

    async fn find_with_author(
        &self,
        id: Uuid,
    ) -> Result<Option<PostWithAuthor>, RepositoryError> {
        let row: Option<PostWithAuthorRow> =
            sqlx::query_as(&format!("{POST_WITH_AUTHOR_SELECT} WHERE p.id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        row.map(PostWithAuthor::try_from).transpose()
    }

    async fn find_all_with_author(&self) -> Result<Vec<PostWithAuthor>, RepositoryError> {
        let rows: Vec<PostWithAuthorRow> = sqlx::query_as(&format!(
            "{POST_WITH_AUTHOR_SELECT} ORDER BY p.created_at DESC, p.id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(PostWithAuthor::try_from).collect()
    }

    async fn find_by_author(&self, author_id: Uuid) -> Result<Vec<PostRecord>, RepositoryError> {
        let rows: Vec<PostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE author_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(author_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(PostRecord::try_from).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &PostChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET
                title = COALESCE(?, title),
                content = COALESCE(?, content),
                published = COALESCE(?, published),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(changes.published)
        .bind(format_timestamp(&updated_at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("post {}", id)));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}
