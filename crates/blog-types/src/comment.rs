//! Comment types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A comment on a post, optionally replying to another comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    /// `None` for top-level comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Comment creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author_id: String,
    pub text: String,
}

impl NewComment {
    /// A top-level comment
    pub fn new(
        post_id: impl Into<String>,
        author_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            parent_id: None,
            author_id: author_id.into(),
            text: text.into(),
        }
    }

    /// A reply to `parent_id`
    pub fn reply(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn into_comment(self, id: String, created_at: DateTime<Utc>) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            parent_id: self.parent_id,
            author_id: self.author_id,
            text: self.text,
            created_at,
        }
    }
}
