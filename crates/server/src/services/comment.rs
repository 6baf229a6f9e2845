// Comment service for business logic

use crate::storage::{models::CreateCommentRow, CommentRow, StorageBackend};
use funpage_core::{ensure_owner, Comment, Identity};
use uuid::Uuid;

use super::ServiceError;

pub struct CommentService {
    db: StorageBackend,
}

impl CommentService {
    pub fn new(db: StorageBackend) -> Self {
        Self { db }
    }

    /// Any authenticated user may comment on an existing article
    pub async fn add(
        &self,
        actor: &Identity,
        news_id: Uuid,
        content: String,
    ) -> Result<Comment, ServiceError> {
        if self.db.get_news(news_id).await?.is_none() {
            return Err(ServiceError::NotFound("News"));
        }

        let row = self
            .db
            .create_comment(CreateCommentRow {
                news_id,
                username: actor.username.clone(),
                content,
            })
            .await?;

        tracing::info!(news_id = %news_id, comment_id = %row.id, "Comment added");
        Ok(Self::row_to_comment(row))
    }

    pub async fn list(&self, news_id: Uuid) -> Result<Vec<Comment>, ServiceError> {
        if self.db.get_news(news_id).await?.is_none() {
            return Err(ServiceError::NotFound("News"));
        }

        let rows = self.db.list_comments(news_id).await?;
        Ok(rows.into_iter().map(Self::row_to_comment).collect())
    }

    pub async fn update(
        &self,
        actor: &Identity,
        news_id: Uuid,
        comment_id: Uuid,
        content: String,
    ) -> Result<Comment, ServiceError> {
        self.load_owned(actor, news_id, comment_id).await?;

        let row = self
            .db
            .update_comment(comment_id, content)
            .await?
            .ok_or(ServiceError::NotFound("Comment"))?;

        tracing::info!(comment_id = %comment_id, actor = %actor.username, "Comment updated");
        Ok(Self::row_to_comment(row))
    }

    pub async fn delete(
        &self,
        actor: &Identity,
        news_id: Uuid,
        comment_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.load_owned(actor, news_id, comment_id).await?;

        if !self.db.delete_comment(comment_id).await? {
            return Err(ServiceError::NotFound("Comment"));
        }

        tracing::info!(comment_id = %comment_id, actor = %actor.username, "Comment deleted");
        Ok(())
    }

    /// Fetch a comment under `news_id` and check that `actor` wrote it
    async fn load_owned(
        &self,
        actor: &Identity,
        news_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, ServiceError> {
        let comment = self
            .db
            .get_comment(comment_id)
            .await?
            .filter(|c| c.news_id == news_id)
            .map(Self::row_to_comment)
            .ok_or(ServiceError::NotFound("Comment"))?;

        ensure_owner(actor, &comment).map_err(|_| ServiceError::Forbidden("comment"))?;
        Ok(comment)
    }

    fn row_to_comment(row: CommentRow) -> Comment {
        Comment {
            id: row.id,
            news_id: row.news_id,
            content: row.content,
            username: row.username,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
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

    async fn setup() -> (CommentService, Uuid) {
        let db = StorageBackend::in_memory();
        let news = NewsService::new(db.clone())
            .create(&identity("alice"), "Title".into(), "Body".into())
            .await
            .unwrap();
        (CommentService::new(db), news.id)
    }

    #[tokio::test]
    async fn test_commenter_owns_comment() {
        let (service, news_id) = setup().await;
        let bob = identity("bob");
        let comment = service.add(&bob, news_id, "First".into()).await.unwrap();
        assert_eq!(comment.username, "bob");

        // The article author does not own other people's comments.
        let result = service
            .update(&identity("alice"), news_id, comment.id, "Edited".into())
            .await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let updated = service
            .update(&bob, news_id, comment.id, "Edited".into())
            .await
            .unwrap();
        assert_eq!(updated.content, "Edited");
    }

    #[tokio::test]
    async fn test_comment_under_other_news_is_not_found() {
        let (service, news_id) = setup().await;
        let bob = identity("bob");
        let comment = service.add(&bob, news_id, "Hi".into()).await.unwrap();

        let result = service.delete(&bob, Uuid::now_v7(), comment.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound("Comment"))));
    }

    #[tokio::test]
    async fn test_comment_on_missing_news() {
        let (service, _) = setup().await;
        let result = service
            .add(&identity("bob"), Uuid::now_v7(), "Hi".into())
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound("News"))));
    }
}
