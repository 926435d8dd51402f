//! Post types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    /// Whether readers may comment on this post
    pub allow_comments: bool,
    pub created_at: DateTime<Utc>,
}

/// Post creation request
///
/// Identifier and timestamp are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub allow_comments: bool,
}

impl NewPost {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: impl Into<String>,
        allow_comments: bool,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            author_id: author_id.into(),
            allow_comments,
        }
    }

    /// Materialize the request into a post with store-assigned fields
    pub fn into_post(self, id: String, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            author_id: self.author_id,
            allow_comments: self.allow_comments,
            created_at,
        }
    }
}
