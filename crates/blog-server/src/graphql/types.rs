//! GraphQL object types

use async_graphql::{Context, Object, Result as GraphQLResult, SimpleObject};
use blog_core::pagination::Cursor;
use blog_core::{Comment, Post};
use chrono::{DateTime, Utc};

use super::{blog, into_graphql_error};

/// Post as seen by API clients
pub struct PostObject(pub Post);

#[Object(name = "Post")]
impl PostObject {
    async fn id(&self) -> &str {
        &self.0.id
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn content(&self) -> &str {
        &self.0.content
    }

    async fn author_id(&self) -> &str {
        &self.0.author_id
    }

    async fn allow_comments(&self) -> bool {
        self.0.allow_comments
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// Most recent top-level comment; null when there is none or comments are off
    async fn last_comment(&self, ctx: &Context<'_>) -> GraphQLResult<Option<CommentObject>> {
        let comment = blog(ctx)?
            .last_comment(&self.0)
            .await
            .map_err(into_graphql_error)?;

        Ok(comment.map(Into::into))
    }

    /// One page of this post's comments, replies included, oldest first
    async fn comments(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
    ) -> GraphQLResult<Vec<CommentObject>> {
        let comments = blog(ctx)?
            .list_comments(&self.0.id, after.as_deref())
            .await
            .map_err(into_graphql_error)?;

        Ok(comments.into_iter().map(Into::into).collect())
    }
}

impl From<Post> for PostObject {
    fn from(post: Post) -> Self {
        PostObject(post)
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Comment")]
pub struct CommentObject {
    pub id: String,
    pub post_id: String,
    pub parent_id: Option<String>,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Pass as `after` to continue listing behind this comment
    pub cursor: String,
}

impl From<Comment> for CommentObject {
    fn from(comment: Comment) -> Self {
        let cursor = Cursor::for_comment(&comment).encode();
        CommentObject {
            id: comment.id,
            post_id: comment.post_id,
            parent_id: comment.parent_id,
            author_id: comment.author_id,
            text: comment.text,
            created_at: comment.created_at,
            cursor,
        }
    }
}
