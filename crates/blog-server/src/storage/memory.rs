//! In-memory store (no external dependencies)
//!
//! Both collections live behind one mutex: every operation, read or write,
//! takes the whole lock. Fine for demos and tests, serializes everything.

use async_trait::async_trait;
use blog_core::pagination::{self, Cursor};
use blog_core::validation::{validate_new_comment, validate_new_post};
use blog_core::{
    BlogError, Comment, CommentStore, NewComment, NewPost, Post, PostStore, Result,
    DEFAULT_POSTS_LIMIT,
};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

pub struct MemoryStore {
    state: Mutex<State>,
    posts_limit: usize,
}

#[derive(Default)]
struct State {
    posts: HashMap<String, Post>,
    comments: HashMap<String, Comment>,
    /// Shared by posts and comments, so ids are unique across both
    id_counter: u64,
    last_created_at: Option<DateTime<Utc>>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.id_counter += 1;
        format!("{}{}", prefix, self.id_counter)
    }

    /// Wall clock, bumped forward so no two records share a timestamp
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_posts_limit(DEFAULT_POSTS_LIMIT)
    }

    pub fn with_posts_limit(posts_limit: usize) -> Self {
        Self {
            state: Mutex::new(State::default()),
            posts_limit,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let state = self.state.lock().await;

        let mut posts: Vec<Post> = state.posts.values().cloned().collect();
        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        posts.truncate(self.posts_limit);

        Ok(posts)
    }

    async fn get_post(&self, id: &str) -> Result<Post> {
        let state = self.state.lock().await;

        state
            .posts
            .get(id)
            .cloned()
            .ok_or_else(|| BlogError::PostNotFound(id.to_string()))
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        validate_new_post(&post)?;

        let mut state = self.state.lock().await;
        let id = state.next_id("post-");
        let created_at = state.next_timestamp();
        let post = post.into_post(id, created_at);
        state.posts.insert(post.id.clone(), post.clone());

        debug!("Stored post {} in memory", post.id);
        Ok(post)
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        validate_new_comment(&comment)?;

        let mut state = self.state.lock().await;

        if !state.posts.contains_key(&comment.post_id) {
            return Err(BlogError::PostNotFound(comment.post_id));
        }

        if let Some(parent_id) = &comment.parent_id {
            let parent_in_post = state
                .comments
                .get(parent_id)
                .map(|parent| parent.post_id == comment.post_id)
                .unwrap_or(false);
            if !parent_in_post {
                return Err(BlogError::CommentNotFound(parent_id.clone()));
            }
        }

        let id = state.next_id("com-");
        let created_at = state.next_timestamp();
        let comment = comment.into_comment(id, created_at);
        state.comments.insert(comment.id.clone(), comment.clone());

        debug!(
            "Stored comment {} on post {} in memory",
            comment.id, comment.post_id
        );
        Ok(comment)
    }

    async fn list_comments(&self, post_id: &str, after: Option<&Cursor>) -> Result<Vec<Comment>> {
        let state = self.state.lock().await;

        if !state.posts.contains_key(post_id) {
            return Err(BlogError::PostNotFound(post_id.to_string()));
        }

        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        pagination::sort_comments(&mut comments);

        pagination::page_after(comments, after)
    }

    async fn latest_comment(&self, post_id: &str) -> Result<Option<Comment>> {
        let state = self.state.lock().await;

        let latest = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.is_top_level())
            .max_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .cloned();

        Ok(latest)
    }
}
