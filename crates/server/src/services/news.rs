// News service for business logic

use crate::storage::{
    models::{CreateNewsRow, UpdateNews},
    NewsRow, StorageBackend, TagRow,
};
use funpage_core::{ensure_owner, Identity, News, Tag};
use uuid::Uuid;

use super::ServiceError;

pub struct NewsService {
    db: StorageBackend,
}

impl NewsService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        author: &Identity,
        title: String,
        content: String,
    ) -> Result<News, ServiceError> {
        let row = self
            .db
            .create_news(CreateNewsRow {
                title,
                content,
                author: author.username.clone(),
            })
            .await?;

        tracing::info!(news_id = %row.id, author = %row.author, "News created");
        Ok(Self::row_to_news(row, vec![]))
    }

    pub async fn get(&self, id: Uuid) -> Result<News, ServiceError> {
        let row = self
            .db
            .get_news(id)
            .await?
            .ok_or(ServiceError::NotFound("News"))?;
        self.with_tags(row).await
    }

    pub async fn list_by_author(&self, author: &str) -> Result<Vec<News>, ServiceError> {
        let rows = self.db.list_news_by_author(author).await?;
        self.with_tags_all(rows).await
    }

    pub async fn list_by_tag(&self, tag: &str) -> Result<Vec<News>, ServiceError> {
        let rows = self.db.list_news_by_tag(tag).await?;
        self.with_tags_all(rows).await
    }

    pub async fn update(
        &self,
        actor: &Identity,
        id: Uuid,
        input: UpdateNews,
    ) -> Result<News, ServiceError> {
        self.load_owned(actor, id).await?;

        let row = self
            .db
            .update_news(id, input)
            .await?
            .ok_or(ServiceError::NotFound("News"))?;

        tracing::info!(news_id = %id, actor = %actor.username, "News updated");
        self.with_tags(row).await
    }

    pub async fn delete(&self, actor: &Identity, id: Uuid) -> Result<(), ServiceError> {
        self.load_owned(actor, id).await?;

        if !self.db.delete_news(id).await? {
            return Err(ServiceError::NotFound("News"));
        }

        tracing::info!(news_id = %id, actor = %actor.username, "News deleted");
        Ok(())
    }

    /// Fetch an article and check that `actor` wrote it
    pub(crate) async fn load_owned(
        &self,
        actor: &Identity,
        id: Uuid,
    ) -> Result<NewsRow, ServiceError> {
        load_owned_news(&self.db, actor, id).await
    }

    async fn with_tags(&self, row: NewsRow) -> Result<News, ServiceError> {
        let tags = self.db.list_tags(row.id).await?;
        Ok(Self::row_to_news(row, tags))
    }

    async fn with_tags_all(&self, rows: Vec<NewsRow>) -> Result<Vec<News>, ServiceError> {
        let mut news = Vec::with_capacity(rows.len());
        for row in rows {
            news.push(self.with_tags(row).await?);
        }
        Ok(news)
    }

    fn row_to_news(row: NewsRow, tags: Vec<TagRow>) -> News {
        News {
            id: row.id,
            title: row.title,
            content: row.content,
            author: row.author,
            tags: tags.into_iter().map(row_to_tag).collect(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Fetch an article, then apply the ownership policy to it
pub(crate) async fn load_owned_news(
    db: &StorageBackend,
    actor: &Identity,
    id: Uuid,
) -> Result<NewsRow, ServiceError> {
    let row = db
        .get_news(id)
        .await?
        .ok_or(ServiceError::NotFound("News"))?;
    ensure_owner(actor, &row).map_err(|_| ServiceError::Forbidden("news"))?;
    Ok(row)
}

pub(crate) fn row_to_tag(row: TagRow) -> Tag {
    Tag {
        name: row.name,
        color: row.color,
        created_at: row.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funpage_core::Role;

    fn identity(username: &str) -> Identity {
        Identity::new(Uuid::now_v7().to_string(), username, Role::User)
    }

    #[tokio::test]
    async fn test_owner_can_update() {
        let service = NewsService::new(StorageBackend::in_memory());
        let alice = identity("alice");
        let news = service
            .create(&alice, "Title".into(), "Body".into())
            .await
            .unwrap();

        let updated = service
            .update(
                &alice,
                news.id,
                UpdateNews {
                    title: Some("New title".into()),
                    content: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.content, "Body");
        assert_eq!(updated.author, "alice");
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let service = NewsService::new(StorageBackend::in_memory());
        let news = service
            .create(&identity("bob"), "Title".into(), "Body".into())
            .await
            .unwrap();

        let result = service
            .update(&identity("alice"), news.id, UpdateNews::default())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let result = service.delete(&identity("alice"), news.id).await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        assert!(service.get(news.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_news_is_not_found_before_ownership() {
        let service = NewsService::new(StorageBackend::in_memory());
        let result = service
            .update(&identity("alice"), Uuid::now_v7(), UpdateNews::default())
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound("News"))));
    }

    #[tokio::test]
    async fn test_list_by_author() {
        let service = NewsService::new(StorageBackend::in_memory());
        let alice = identity("alice");
        service.create(&alice, "A".into(), "a".into()).await.unwrap();
        service.create(&alice, "B".into(), "b".into()).await.unwrap();
        service
            .create(&identity("bob"), "C".into(), "c".into())
            .await
            .unwrap();

        let news = service.list_by_author("alice").await.unwrap();
        assert_eq!(news.len(), 2);
        assert!(news.iter().all(|n| n.author == "alice"));
    }
}
