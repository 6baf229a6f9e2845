// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// StorageBackend works with either PostgreSQL (production) or the
// in-memory database (dev mode and tests).

use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Connect to PostgreSQL and apply migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(Arc::new(InMemoryDatabase::new()))
    }

    /// Short name reported by the health endpoint
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::InMemory(_) => "memory",
        }
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_username(username).await,
            Self::InMemory(db) => db.get_user_by_username(username).await,
        }
    }

    pub async fn mark_user_verified(&self, username: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.mark_user_verified(username).await,
            Self::InMemory(db) => db.mark_user_verified(username).await,
        }
    }

    pub async fn delete_user_by_username(&self, username: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_user_by_username(username).await,
            Self::InMemory(db) => db.delete_user_by_username(username).await,
        }
    }

    // ============================================
    // News
    // ============================================

    pub async fn create_news(&self, input: CreateNewsRow) -> Result<NewsRow> {
        match self {
            Self::Postgres(db) => db.create_news(input).await,
            Self::InMemory(db) => db.create_news(input).await,
        }
    }

    pub async fn get_news(&self, id: Uuid) -> Result<Option<NewsRow>> {
        match self {
            Self::Postgres(db) => db.get_news(id).await,
            Self::InMemory(db) => db.get_news(id).await,
        }
    }

    pub async fn list_news_by_author(&self, author: &str) -> Result<Vec<NewsRow>> {
        match self {
            Self::Postgres(db) => db.list_news_by_author(author).await,
            Self::InMemory(db) => db.list_news_by_author(author).await,
        }
    }

    pub async fn list_news_by_tag(&self, tag: &str) -> Result<Vec<NewsRow>> {
        match self {
            Self::Postgres(db) => db.list_news_by_tag(tag).await,
            Self::InMemory(db) => db.list_news_by_tag(tag).await,
        }
    }

    pub async fn update_news(&self, id: Uuid, input: UpdateNews) -> Result<Option<NewsRow>> {
        match self {
            Self::Postgres(db) => db.update_news(id, input).await,
            Self::InMemory(db) => db.update_news(id, input).await,
        }
    }

    pub async fn delete_news(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_news(id).await,
            Self::InMemory(db) => db.delete_news(id).await,
        }
    }

    // ============================================
    // Tags
    // ============================================

    pub async fn create_tag(&self, input: CreateTagRow) -> Result<TagRow> {
        match self {
            Self::Postgres(db) => db.create_tag(input).await,
            Self::InMemory(db) => db.create_tag(input).await,
        }
    }

    pub async fn get_tag(&self, news_id: Uuid, name: &str) -> Result<Option<TagRow>> {
        match self {
            Self::Postgres(db) => db.get_tag(news_id, name).await,
            Self::InMemory(db) => db.get_tag(news_id, name).await,
        }
    }

    pub async fn list_tags(&self, news_id: Uuid) -> Result<Vec<TagRow>> {
        match self {
            Self::Postgres(db) => db.list_tags(news_id).await,
            Self::InMemory(db) => db.list_tags(news_id).await,
        }
    }

    pub async fn update_tag(
        &self,
        news_id: Uuid,
        name: &str,
        input: UpdateTag,
    ) -> Result<Option<TagRow>> {
        match self {
            Self::Postgres(db) => db.update_tag(news_id, name, input).await,
            Self::InMemory(db) => db.update_tag(news_id, name, input).await,
        }
    }

    pub async fn delete_tag(&self, news_id: Uuid, name: &str) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_tag(news_id, name).await,
            Self::InMemory(db) => db.delete_tag(news_id, name).await,
        }
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn create_comment(&self, input: CreateCommentRow) -> Result<CommentRow> {
        match self {
            Self::Postgres(db) => db.create_comment(input).await,
            Self::InMemory(db) => db.create_comment(input).await,
        }
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<CommentRow>> {
        match self {
            Self::Postgres(db) => db.get_comment(id).await,
            Self::InMemory(db) => db.get_comment(id).await,
        }
    }

    pub async fn list_comments(&self, news_id: Uuid) -> Result<Vec<CommentRow>> {
        match self {
            Self::Postgres(db) => db.list_comments(news_id).await,
            Self::InMemory(db) => db.list_comments(news_id).await,
        }
    }

    pub async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<CommentRow>> {
        match self {
            Self::Postgres(db) => db.update_comment(id, content).await,
            Self::InMemory(db) => db.update_comment(id, content).await,
        }
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_comment(id).await,
            Self::InMemory(db) => db.delete_comment(id).await,
        }
    }
}
