// Repository layer for PostgreSQL

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;
use super::{duplicate_tag, duplicate_username, DuplicateKey};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, password_hash, role, verified, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, duplicate_username))?;

        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, role, verified, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn mark_user_verified(&self, username: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET verified = TRUE, updated_at = NOW()
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_user_by_username(&self, username: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // News
    // ============================================

    pub async fn create_news(&self, input: CreateNewsRow) -> Result<NewsRow> {
        let row = sqlx::query_as::<_, NewsRow>(
            r#"
            INSERT INTO news (id, title, content, author)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.author)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_news(&self, id: Uuid) -> Result<Option<NewsRow>> {
        let row = sqlx::query_as::<_, NewsRow>(
            r#"
            SELECT id, title, content, author, created_at, updated_at
            FROM news
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_news_by_author(&self, author: &str) -> Result<Vec<NewsRow>> {
        let rows = sqlx::query_as::<_, NewsRow>(
            r#"
            SELECT id, title, content, author, created_at, updated_at
            FROM news
            WHERE author = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(author)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_news_by_tag(&self, tag: &str) -> Result<Vec<NewsRow>> {
        let rows = sqlx::query_as::<_, NewsRow>(
            r#"
            SELECT n.id, n.title, n.content, n.author, n.created_at, n.updated_at
            FROM news n
            JOIN news_tags t ON t.news_id = n.id
            WHERE t.name = $1
            ORDER BY n.created_at DESC, n.id DESC
            "#,
        )
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_news(&self, id: Uuid, input: UpdateNews) -> Result<Option<NewsRow>> {
        let row = sqlx::query_as::<_, NewsRow>(
            r#"
            UPDATE news
            SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, content, author, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.title)
        .bind(&input.content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_news(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Tags
    // ============================================

    pub async fn create_tag(&self, input: CreateTagRow) -> Result<TagRow> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            INSERT INTO news_tags (news_id, name, color)
            VALUES ($1, $2, $3)
            RETURNING news_id, name, color, created_at
            "#,
        )
        .bind(input.news_id)
        .bind(&input.name)
        .bind(&input.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, || duplicate_tag(&input.name)))?;

        Ok(row)
    }

    pub async fn get_tag(&self, news_id: Uuid, name: &str) -> Result<Option<TagRow>> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT news_id, name, color, created_at
            FROM news_tags
            WHERE news_id = $1 AND name = $2
            "#,
        )
        .bind(news_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_tags(&self, news_id: Uuid) -> Result<Vec<TagRow>> {
        let rows = sqlx::query_as::<_, TagRow>(
            r#"
            SELECT news_id, name, color, created_at
            FROM news_tags
            WHERE news_id = $1
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .bind(news_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_tag(
        &self,
        news_id: Uuid,
        name: &str,
        input: UpdateTag,
    ) -> Result<Option<TagRow>> {
        let row = sqlx::query_as::<_, TagRow>(
            r#"
            UPDATE news_tags
            SET name = $3, color = $4
            WHERE news_id = $1 AND name = $2
            RETURNING news_id, name, color, created_at
            "#,
        )
        .bind(news_id)
        .bind(name)
        .bind(&input.name)
        .bind(&input.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_duplicate(e, || duplicate_tag(&input.name)))?;

        Ok(row)
    }

    pub async fn delete_tag(&self, news_id: Uuid, name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news_tags WHERE news_id = $1 AND name = $2")
            .bind(news_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn create_comment(&self, input: CreateCommentRow) -> Result<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO news_comments (id, news_id, username, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, news_id, username, content, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(input.news_id)
        .bind(&input.username)
        .bind(&input.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<CommentRow>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, news_id, username, content, created_at, updated_at
            FROM news_comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_comments(&self, news_id: Uuid) -> Result<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, news_id, username, content, created_at, updated_at
            FROM news_comments
            WHERE news_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(news_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<CommentRow>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            UPDATE news_comments
            SET content = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, news_id, username, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news_comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Postgres SQLSTATE 23505 (unique_violation)
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn map_duplicate(err: sqlx::Error, duplicate: impl FnOnce() -> DuplicateKey) -> anyhow::Error {
    if is_unique_violation(&err) {
        duplicate().into()
    } else {
        err.into()
    }
}
