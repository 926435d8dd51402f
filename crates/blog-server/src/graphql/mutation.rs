use async_graphql::{Context, Object, Result as GraphQLResult};
use blog_core::{NewComment, NewPost};

use super::types::{CommentObject, PostObject};
use super::{blog, into_graphql_error};

#[derive(Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        title: String,
        content: String,
        author_id: String,
        allow_comments: bool,
    ) -> GraphQLResult<PostObject> {
        let post = blog(ctx)?
            .create_post(NewPost {
                title,
                content,
                author_id,
                allow_comments,
            })
            .await
            .map_err(into_graphql_error)?;

        Ok(post.into())
    }

    /// Omit `parentId` for a top-level comment
    async fn add_comment(
        &self,
        ctx: &Context<'_>,
        post_id: String,
        parent_id: Option<String>,
        author_id: String,
        text: String,
    ) -> GraphQLResult<CommentObject> {
        let comment = blog(ctx)?
            .add_comment(NewComment {
                post_id,
                parent_id,
                author_id,
                text,
            })
            .await
            .map_err(into_graphql_error)?;

        Ok(comment.into())
    }
}
