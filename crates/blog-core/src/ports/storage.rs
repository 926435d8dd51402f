//! Storage traits for persistence
//!
//! Every backend implements the same contract, so the query layer can hold an
//! `Arc<dyn BlogStore>` and never know which one it talks to.

use crate::pagination::Cursor;
use crate::Result;
use async_trait::async_trait;
use blog_types::{Comment, NewComment, NewPost, Post};

/// Post store
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Newest posts first, capped at the store's configured limit
    async fn list_posts(&self) -> Result<Vec<Post>>;

    /// Fails with `PostNotFound` when `id` is unknown
    async fn get_post(&self, id: &str) -> Result<Post>;

    /// Assigns id and creation time
    async fn create_post(&self, post: NewPost) -> Result<Post>;
}

/// Comment store
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Validates the text and the post reference, then assigns id and
    /// creation time. Nothing is persisted on failure.
    async fn add_comment(&self, comment: NewComment) -> Result<Comment>;

    /// One page of a post's comments (replies included) in ascending
    /// `(created_at, id)` order, starting strictly after `after` if given.
    async fn list_comments(&self, post_id: &str, after: Option<&Cursor>) -> Result<Vec<Comment>>;

    /// Most recent top-level comment of a post; `None` is not an error
    async fn latest_comment(&self, post_id: &str) -> Result<Option<Comment>>;
}

/// Full storage contract consumed by the query layer
pub trait BlogStore: PostStore + CommentStore {}

impl<T: PostStore + CommentStore> BlogStore for T {}
