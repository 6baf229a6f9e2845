// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// Mirrors the PostgreSQL repository API on top of HashMaps so the server
// runs without a database. Deleting an article cascades to its tags and
// comments the same way the foreign keys do.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;
use super::{duplicate_tag, duplicate_username};

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    news: RwLock<HashMap<Uuid, NewsRow>>,
    tags: RwLock<HashMap<(Uuid, String), TagRow>>,
    comments: RwLock<HashMap<Uuid, CommentRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<UserRow> {
        let mut users = self.users.write();
        if users.values().any(|u| u.username == input.username) {
            return Err(duplicate_username().into());
        }

        let now = Self::now();
        let id = Uuid::now_v7();
        let row = UserRow {
            id,
            username: input.username,
            password_hash: input.password_hash,
            role: input.role,
            verified: false,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    pub async fn mark_user_verified(&self, username: &str) -> Result<bool> {
        let mut users = self.users.write();
        match users.values_mut().find(|u| u.username == username) {
            Some(user) => {
                user.verified = true;
                user.updated_at = Self::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn delete_user_by_username(&self, username: &str) -> Result<bool> {
        let mut users = self.users.write();
        let id = users
            .values()
            .find(|u| u.username == username)
            .map(|u| u.id);
        Ok(id.and_then(|id| users.remove(&id)).is_some())
    }

    // ============================================
    // News
    // ============================================

    pub async fn create_news(&self, input: CreateNewsRow) -> Result<NewsRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = NewsRow {
            id,
            title: input.title,
            content: input.content,
            author: input.author,
            created_at: now,
            updated_at: now,
        };
        self.news.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_news(&self, id: Uuid) -> Result<Option<NewsRow>> {
        Ok(self.news.read().get(&id).cloned())
    }

    pub async fn list_news_by_author(&self, author: &str) -> Result<Vec<NewsRow>> {
        let mut rows: Vec<NewsRow> = self
            .news
            .read()
            .values()
            .filter(|n| n.author == author)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    pub async fn list_news_by_tag(&self, tag: &str) -> Result<Vec<NewsRow>> {
        let tagged: Vec<Uuid> = self
            .tags
            .read()
            .keys()
            .filter(|(_, name)| name == tag)
            .map(|(news_id, _)| *news_id)
            .collect();

        let news = self.news.read();
        let mut rows: Vec<NewsRow> = tagged
            .iter()
            .filter_map(|id| news.get(id).cloned())
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    pub async fn update_news(&self, id: Uuid, input: UpdateNews) -> Result<Option<NewsRow>> {
        let mut news = self.news.write();
        if let Some(row) = news.get_mut(&id) {
            if let Some(title) = input.title {
                row.title = title;
            }
            if let Some(content) = input.content {
                row.content = content;
            }
            row.updated_at = Self::now();
            Ok(Some(row.clone()))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_news(&self, id: Uuid) -> Result<bool> {
        let removed = self.news.write().remove(&id).is_some();
        if removed {
            self.tags.write().retain(|(news_id, _), _| *news_id != id);
            self.comments.write().retain(|_, c| c.news_id != id);
        }
        Ok(removed)
    }

    // ============================================
    // Tags
    // ============================================

    pub async fn create_tag(&self, input: CreateTagRow) -> Result<TagRow> {
        let mut tags = self.tags.write();
        let key = (input.news_id, input.name.clone());
        if tags.contains_key(&key) {
            return Err(duplicate_tag(&input.name).into());
        }

        let row = TagRow {
            news_id: input.news_id,
            name: input.name,
            color: input.color,
            created_at: Self::now(),
        };
        tags.insert(key, row.clone());
        Ok(row)
    }

    pub async fn get_tag(&self, news_id: Uuid, name: &str) -> Result<Option<TagRow>> {
        Ok(self
            .tags
            .read()
            .get(&(news_id, name.to_string()))
            .cloned())
    }

    pub async fn list_tags(&self, news_id: Uuid) -> Result<Vec<TagRow>> {
        let mut rows: Vec<TagRow> = self
            .tags
            .read()
            .values()
            .filter(|t| t.news_id == news_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, &a.name).cmp(&(b.created_at, &b.name)));
        Ok(rows)
    }

    pub async fn update_tag(
        &self,
        news_id: Uuid,
        name: &str,
        input: UpdateTag,
    ) -> Result<Option<TagRow>> {
        let mut tags = self.tags.write();
        let old_key = (news_id, name.to_string());
        let new_key = (news_id, input.name.clone());

        if new_key != old_key && tags.contains_key(&new_key) {
            return Err(duplicate_tag(&input.name).into());
        }

        match tags.remove(&old_key) {
            Some(mut row) => {
                row.name = input.name;
                row.color = input.color;
                tags.insert(new_key, row.clone());
                Ok(Some(row))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_tag(&self, news_id: Uuid, name: &str) -> Result<bool> {
        Ok(self
            .tags
            .write()
            .remove(&(news_id, name.to_string()))
            .is_some())
    }

    // ============================================
    // Comments
    // ============================================

    pub async fn create_comment(&self, input: CreateCommentRow) -> Result<CommentRow> {
        if !self.news.read().contains_key(&input.news_id) {
            return Err(anyhow!("News not found: {}", input.news_id));
        }

        let now = Self::now();
        let id = Uuid::now_v7();
        let row = CommentRow {
            id,
            news_id: input.news_id,
            username: input.username,
            content: input.content,
            created_at: now,
            updated_at: now,
        };
        self.comments.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Option<CommentRow>> {
        Ok(self.comments.read().get(&id).cloned())
    }

    pub async fn list_comments(&self, news_id: Uuid) -> Result<Vec<CommentRow>> {
        let mut rows: Vec<CommentRow> = self
            .comments
            .read()
            .values()
            .filter(|c| c.news_id == news_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(rows)
    }

    pub async fn update_comment(&self, id: Uuid, content: String) -> Result<Option<CommentRow>> {
        let mut comments = self.comments.write();
        if let Some(row) = comments.get_mut(&id) {
            row.content = content;
            row.updated_at = Self::now();
            Ok(Some(row.clone()))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<bool> {
        Ok(self.comments.write().remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DuplicateKey;

    fn create_news_input(author: &str) -> CreateNewsRow {
        CreateNewsRow {
            title: "Title".to_string(),
            content: "Body".to_string(),
            author: author.to_string(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = InMemoryDatabase::new();
        let input = CreateUserRow {
            username: "alice".to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
        };
        db.create_user(input.clone()).await.unwrap();
        let err = db.create_user(input).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<DuplicateKey>(),
            Some(&duplicate_username())
        );
    }

    #[tokio::test]
    async fn test_delete_news_cascades() {
        let db = InMemoryDatabase::new();
        let news = db.create_news(create_news_input("alice")).await.unwrap();
        db.create_tag(CreateTagRow {
            news_id: news.id,
            name: "events".to_string(),
            color: "red".to_string(),
        })
        .await
        .unwrap();
        db.create_comment(CreateCommentRow {
            news_id: news.id,
            username: "bob".to_string(),
            content: "Nice".to_string(),
        })
        .await
        .unwrap();

        assert!(db.delete_news(news.id).await.unwrap());
        assert!(db.list_tags(news.id).await.unwrap().is_empty());
        assert!(db.list_comments(news.id).await.unwrap().is_empty());
        assert!(!db.delete_news(news.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_news_by_tag() {
        let db = InMemoryDatabase::new();
        let tagged = db.create_news(create_news_input("alice")).await.unwrap();
        db.create_news(create_news_input("alice")).await.unwrap();
        db.create_tag(CreateTagRow {
            news_id: tagged.id,
            name: "sports".to_string(),
            color: "green".to_string(),
        })
        .await
        .unwrap();

        let found = db.list_news_by_tag("sports").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tagged.id);
    }

    #[tokio::test]
    async fn test_rename_tag_onto_existing_name_fails() {
        let db = InMemoryDatabase::new();
        let news = db.create_news(create_news_input("alice")).await.unwrap();
        for name in ["a", "b"] {
            db.create_tag(CreateTagRow {
                news_id: news.id,
                name: name.to_string(),
                color: "blue".to_string(),
            })
            .await
            .unwrap();
        }

        let result = db
            .update_tag(
                news.id,
                "a",
                UpdateTag {
                    name: "b".to_string(),
                    color: "blue".to_string(),
                },
            )
            .await;
        assert_eq!(
            result.unwrap_err().downcast_ref::<DuplicateKey>(),
            Some(&duplicate_tag("b"))
        );
        assert!(db.get_tag(news.id, "a").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_comment_on_missing_news_fails() {
        let db = InMemoryDatabase::new();
        let result = db
            .create_comment(CreateCommentRow {
                news_id: Uuid::now_v7(),
                username: "bob".to_string(),
                content: "Hello".to_string(),
            })
            .await;
        assert!(result.is_err());
    }
}
