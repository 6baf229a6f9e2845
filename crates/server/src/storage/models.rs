// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Auth models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

// ============================================
// News models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct NewsRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateNewsRow {
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateNews {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TagRow {
    pub news_id: Uuid,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateTagRow {
    pub news_id: Uuid,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone)]
pub struct UpdateTag {
    pub name: String,
    pub color: String,
}

// ============================================
// Comment models
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub news_id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateCommentRow {
    pub news_id: Uuid,
    pub username: String,
    pub content: String,
}
