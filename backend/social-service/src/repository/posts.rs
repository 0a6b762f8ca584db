use super::PostRepository;
use crate::domain::models::{FeedQuery, FeedRow, NewPost, Post};
use crate::error::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for Post operations
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn list_feed(&self, query: &FeedQuery) -> Result<Vec<FeedRow>> {
        let rows = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT p.id, p.user_id, p.content, p.media_urls, p.likes_count, p.reposts_count,
                   p.created_at, pr.username, pr.avatar_url,
                   (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count,
                   (SELECT COUNT(*) FROM bookmarks b WHERE b.post_id = p.id) AS bookmark_count,
                   EXISTS(
                       SELECT 1 FROM post_likes l
                       WHERE l.post_id = p.id AND l.user_id = $1
                   ) AS is_liked,
                   EXISTS(
                       SELECT 1 FROM bookmarks b
                       WHERE b.post_id = p.id AND b.user_id = $1
                   ) AS is_bookmarked
            FROM posts p
            JOIN profiles pr ON pr.id = p.user_id
            WHERE ($2::uuid IS NULL OR p.user_id = $2)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $3
            "#,
        )
        .bind(query.viewer)
        .bind(query.author)
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_post(&self, post_id: Uuid) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, content, media_urls, likes_count, reposts_count, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn insert_post(&self, post: &NewPost) -> Result<Post> {
        let created = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (user_id, content, media_urls)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, media_urls, likes_count, reposts_count, created_at
            "#,
        )
        .bind(post.user_id)
        .bind(&post.content)
        .bind(&post.media_urls)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn delete_post(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
