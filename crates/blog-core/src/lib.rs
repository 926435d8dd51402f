//! Blog Core Library
//!
//! Storage contract, error kinds, cursor codec and input validation shared by
//! every storage backend and by the query layer.

// Re-export pure types from blog-types
pub use blog_types::*;

pub mod error;
pub mod pagination;
pub mod ports;
pub mod validation;

pub use error::{BlogError, Result};
pub use pagination::{Cursor, COMMENTS_PAGE_SIZE, DEFAULT_POSTS_LIMIT};
pub use ports::{BlogStore, CommentStore, PostStore};
