use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentId, NewComment},
        post::{NewPost, PageWindow, Post, PostId, PostRecord},
        user::{AuthorSummary, FacilityId, UserId},
    },
    store::SocialStore,
};

/// PostgreSQL store. Counter maintenance and cascades live in the schema
/// (triggers and `ON DELETE CASCADE`, see `migrations/`), so every method
/// here is a single statement on a pooled connection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct PostRow {
    id: i64,
    content: String,
    image_url: Option<String>,
    author_id: i64,
    author_name: String,
    facility_id: i64,
    likes_count: i32,
    comments_count: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
    liked_by_me: bool,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            content: row.content,
            image_url: row.image_url,
            author: AuthorSummary {
                id: row.author_id,
                display_name: row.author_name,
            },
            facility_id: row.facility_id,
            likes_count: row.likes_count,
            comments_count: row.comments_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
            liked_by_me: row.liked_by_me,
        }
    }
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: i64,
    post_id: i64,
    author_id: i64,
    author_name: String,
    content: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            post_id: row.post_id,
            author: AuthorSummary {
                id: row.author_id,
                display_name: row.author_name,
            },
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PostRecordRow {
    id: i64,
    author_id: i64,
    facility_id: i64,
    content: String,
}

const POST_COLUMNS: &str = r#"
    p.id, p.content, p.image_url,
    p.author_id, u.display_name AS author_name,
    p.facility_id, p.likes_count, p.comments_count,
    p.created_at, p.updated_at,
    EXISTS(
        SELECT 1 FROM post_likes pl
        WHERE pl.post_id = p.id AND pl.user_id = $2
    ) AS liked_by_me
"#;

#[async_trait]
impl SocialStore for PgStore {
    async fn list_posts(
        &self,
        facility_id: FacilityId,
        viewer_id: UserId,
        window: PageWindow,
    ) -> Result<Vec<Post>, AppError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.facility_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(facility_id)
            .bind(viewer_id)
            .bind(window.limit)
            .bind(window.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list posts: {:?}", e);
                AppError::from(e)
            })?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(
        &self,
        facility_id: FacilityId,
        viewer_id: UserId,
        post_id: PostId,
    ) -> Result<Option<Post>, AppError> {
        let sql = format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts p
            JOIN users u ON u.id = p.author_id
            WHERE p.facility_id = $1 AND p.id = $3
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(facility_id)
            .bind(viewer_id)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Post::from))
    }

    async fn find_post(&self, post_id: PostId) -> Result<Option<PostRecord>, AppError> {
        let row = sqlx::query_as::<_, PostRecordRow>(
            "SELECT id, author_id, facility_id, content FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PostRecord {
            id: r.id,
            author_id: r.author_id,
            facility_id: r.facility_id,
            content: r.content,
        }))
    }

    async fn insert_post(&self, post: NewPost) -> Result<PostId, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts (author_id, facility_id, content, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(post.author_id)
        .bind(post.facility_id)
        .bind(post.content)
        .bind(post.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create post: {:?}", e);
            AppError::from(e)
        })?;

        Ok(id)
    }

    async fn update_post_content(
        &self,
        post_id: PostId,
        author_id: UserId,
        content: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE posts SET content = $1, updated_at = NOW() WHERE id = $2 AND author_id = $3",
        )
        .bind(content)
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update post: {:?}", e);
            AppError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, post_id: PostId, author_id: UserId) -> Result<bool, AppError> {
        // Comments and likes go with the row via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete post: {:?}", e);
                AppError::from(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT
                c.id, c.post_id, c.author_id, u.display_name AS author_name,
                c.content, c.created_at
            FROM comments c
            JOIN users u ON c.author_id = u.id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<CommentId, AppError> {
        // trg_post_comments_count bumps the counter inside this statement.
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO comments (post_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(comment.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {:?}", e);
            AppError::from(e)
        })?;

        Ok(id)
    }

    async fn insert_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, AppError> {
        // The primary key absorbs concurrent duplicates; the trigger only fires for a real insert.
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (post_id, user_id) DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&self, post_id: PostId, user_id: UserId) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
