use async_graphql::{Context, Object, Result as GraphQLResult, ID};

use super::types::{CommentObject, PostObject};
use super::{blog, into_graphql_error};

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Newest posts first
    async fn posts(&self, ctx: &Context<'_>) -> GraphQLResult<Vec<PostObject>> {
        let posts = blog(ctx)?.list_posts().await.map_err(into_graphql_error)?;
        Ok(posts.into_iter().map(Into::into).collect())
    }

    async fn post(&self, ctx: &Context<'_>, id: ID) -> GraphQLResult<PostObject> {
        let post = blog(ctx)?.get_post(&id).await.map_err(into_graphql_error)?;
        Ok(post.into())
    }

    async fn comments(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        after: Option<String>,
    ) -> GraphQLResult<Vec<CommentObject>> {
        let comments = blog(ctx)?
            .list_comments(&post_id, after.as_deref())
            .await
            .map_err(into_graphql_error)?;

        Ok(comments.into_iter().map(Into::into).collect())
    }
}
