//! GraphQL schema
//!
//! The blog service is injected as schema data when the schema is built;
//! resolvers never reach for a global store.

pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, Schema};
use blog_core::BlogError;

use crate::services::BlogService;

pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type BlogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(blog: BlogService) -> BlogSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(blog)
        .finish()
}

fn blog<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a BlogService> {
    ctx.data::<BlogService>()
}

/// Client-facing error with `extensions.code`; driver details stay in the logs
fn into_graphql_error(e: BlogError) -> async_graphql::Error {
    let code = e.code();
    let message = if e.is_infrastructure() {
        "internal storage error".to_string()
    } else {
        e.to_string()
    };

    async_graphql::Error::new(message).extend_with(|_, ext| ext.set("code", code))
}
