//! Blog service: the only path from the query layer to storage

use blog_core::pagination::Cursor;
use blog_core::{
    BlogError, BlogStore, Comment, CommentStore, NewComment, NewPost, Post, PostStore, Result,
};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct BlogService {
    store: Arc<dyn BlogStore>,
}

impl BlogService {
    pub fn new(store: Arc<dyn BlogStore>) -> Self {
        Self { store }
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        debug!("Listing posts");
        self.store.list_posts().await.map_err(log_failure)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post> {
        debug!("Fetching post {}", id);
        self.store.get_post(id).await.map_err(log_failure)
    }

    pub async fn create_post(&self, post: NewPost) -> Result<Post> {
        info!(
            "Creating post: author={}, title={:?}, allow_comments={}",
            post.author_id, post.title, post.allow_comments
        );

        let post = self.store.create_post(post).await.map_err(log_failure)?;
        info!("Post created: id={}", post.id);
        Ok(post)
    }

    /// Adds a comment, refusing posts that have comments switched off
    pub async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        info!(
            "Adding comment: post={}, parent={:?}, author={}",
            comment.post_id, comment.parent_id, comment.author_id
        );

        let post = self
            .store
            .get_post(&comment.post_id)
            .await
            .map_err(log_failure)?;
        if !post.allow_comments {
            return Err(BlogError::Validation(format!(
                "comments are disabled for post {}",
                post.id
            )));
        }

        let comment = self.store.add_comment(comment).await.map_err(log_failure)?;
        info!("Comment created: id={}, post={}", comment.id, comment.post_id);
        Ok(comment)
    }

    /// One page of comments. An empty `after` is the same as no cursor.
    pub async fn list_comments(&self, post_id: &str, after: Option<&str>) -> Result<Vec<Comment>> {
        let cursor = match after {
            Some(raw) if !raw.is_empty() => Some(Cursor::decode(raw)?),
            _ => None,
        };

        debug!("Listing comments: post={}, after={:?}", post_id, cursor);
        self.store
            .list_comments(post_id, cursor.as_ref())
            .await
            .map_err(log_failure)
    }

    /// Latest top-level comment, hidden for posts with comments switched off
    pub async fn last_comment(&self, post: &Post) -> Result<Option<Comment>> {
        if !post.allow_comments {
            return Ok(None);
        }
        self.store.latest_comment(&post.id).await.map_err(log_failure)
    }
}

fn log_failure(e: BlogError) -> BlogError {
    if e.is_infrastructure() {
        error!("Storage failure: {}", e);
    } else {
        debug!("Request rejected: {}", e);
    }
    e
}
