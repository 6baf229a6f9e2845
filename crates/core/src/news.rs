// News domain types
//
// Articles carry tags inline and own their comments. Both articles and
// comments record their author at creation; the field never changes later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ownership::Owned;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// News article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct News {
    /// Unique identifier for the article.
    pub id: Uuid,
    /// Headline.
    #[cfg_attr(feature = "openapi", schema(example = "Campus library opens late"))]
    pub title: String,
    /// Article body.
    pub content: String,
    /// Username of the account that created the article.
    pub author: String,
    /// Tags attached to the article.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Timestamp when the article was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the article was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Owned for News {
    fn owner(&self) -> &str {
        &self.author
    }
}

/// Tag attached to an article. Names are unique per article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Tag {
    #[serde(rename = "tag_name")]
    #[cfg_attr(feature = "openapi", schema(example = "events"))]
    pub name: String,
    #[cfg_attr(feature = "openapi", schema(example = "#ff8800"))]
    pub color: String,
    pub created_at: DateTime<Utc>,
}

/// Comment on an article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Comment {
    pub id: Uuid,
    pub news_id: Uuid,
    pub content: String,
    /// Username of the commenter. Acts as the owner for updates and deletes.
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner(&self) -> &str {
        &self.username
    }
}
