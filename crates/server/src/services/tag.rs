// Tag service for business logic
//
// Tags have no author of their own. They belong to the article, so the
// article's author is the one allowed to change them.

use crate::storage::{
    models::{CreateTagRow, UpdateTag},
    StorageBackend,
};
use funpage_core::{Identity, Tag};
use uuid::Uuid;

use super::news::{load_owned_news, row_to_tag};
use super::ServiceError;

pub struct TagService {
    db: StorageBackend,
}

impl TagService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    pub async fn add(
        &self,
        actor: &Identity,
        news_id: Uuid,
        name: String,
        color: String,
    ) -> Result<Tag, ServiceError> {
        load_owned_news(&self.db, actor, news_id).await?;

        if self.db.get_tag(news_id, &name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Tag '{}' already exists on this news",
                name
            )));
        }

        let row = self
            .db
            .create_tag(CreateTagRow {
                news_id,
                name,
                color,
            })
            .await?;

        tracing::info!(news_id = %news_id, tag = %row.name, "Tag added");
        Ok(row_to_tag(row))
    }

    pub async fn list(&self, news_id: Uuid) -> Result<Vec<Tag>, ServiceError> {
        if self.db.get_news(news_id).await?.is_none() {
            return Err(ServiceError::NotFound("News"));
        }

        let rows = self.db.list_tags(news_id).await?;
        Ok(rows.into_iter().map(row_to_tag).collect())
    }

    pub async fn update(
        &self,
        actor: &Identity,
        news_id: Uuid,
        tag_name: &str,
        input: UpdateTag,
    ) -> Result<Tag, ServiceError> {
        load_owned_news(&self.db, actor, news_id).await?;

        if self.db.get_tag(news_id, tag_name).await?.is_none() {
            return Err(ServiceError::NotFound("Tag"));
        }
        if input.name != tag_name && self.db.get_tag(news_id, &input.name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Tag '{}' already exists on this news",
                input.name
            )));
        }

        let row = self
            .db
            .update_tag(news_id, tag_name, input)
            .await?
            .ok_or(ServiceError::NotFound("Tag"))?;

        tracing::info!(news_id = %news_id, from = %tag_name, to = %row.name, "Tag updated");
        Ok(row_to_tag(row))
    }

    pub async fn delete(
        &self,
        actor: &Identity,
        news_id: Uuid,
        tag_name: &str,
    ) -> Result<(), ServiceError> {
        load_owned_news(&self.db, actor, news_id).await?;

        if !self.db.delete_tag(news_id, tag_name).await? {
            return Err(ServiceError::NotFound("Tag"));
        }

        tracing::info!(news_id = %news_id, tag = %tag_name, "Tag deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NewsService;
    use funpage_core::Role;

    fn identity(username: &str) -> Identity {
        Identity::new(Uuid::now_v7().to_string(), username, Role::User)
    }

    async fn setup() -> (TagService, Uuid) {
        let db = StorageBackend::in_memory();
        let news = NewsService::new(db.clone())
            .create(&identity("alice"), "Title".into(), "Body".into())
            .await
            .unwrap();
        (TagService::new(db), news.id)
    }

    #[tokio::test]
    async fn test_duplicate_tag_conflicts() {
        let (service, news_id) = setup().await;
        let alice = identity("alice");
        service
            .add(&alice, news_id, "events".into(), "red".into())
            .await
            .unwrap();

        let result = service
            .add(&alice, news_id, "events".into(), "blue".into())
            .await;
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_article_author_manages_tags() {
        let (service, news_id) = setup().await;
        let result = service
            .add(&identity("bob"), news_id, "spam".into(), "red".into())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
        assert!(service.list(news_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rename_tag() {
        let (service, news_id) = setup().await;
        let alice = identity("alice");
        service
            .add(&alice, news_id, "old".into(), "red".into())
            .await
            .unwrap();

        let tag = service
            .update(
                &alice,
                news_id,
                "old",
                UpdateTag {
                    name: "new".into(),
                    color: "green".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(tag.name, "new");
        assert_eq!(tag.color, "green");

        let result = service.delete(&alice, news_id, "old").await;
        assert!(matches!(result, Err(ServiceError::NotFound("Tag"))));
        service.delete(&alice, news_id, "new").await.unwrap();
    }
}
