//! Keyset pagination for comment listings
//!
//! Comments are always ordered ascending by `(created_at, id)`. A cursor names
//! one comment of that order; listing "after" it resumes strictly behind it.

use crate::error::{BlogError, Result};
use blog_types::Comment;

/// Maximum number of comments returned by a single listing call
pub const COMMENTS_PAGE_SIZE: usize = 5;

/// Default cap on `list_posts`
pub const DEFAULT_POSTS_LIMIT: usize = 10;

const CURSOR_PREFIX: &str = "cur-";

/// Opaque comment cursor, `"cur-" + comment id` on the wire
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    comment_id: String,
}

impl Cursor {
    pub fn for_comment(comment: &Comment) -> Self {
        Self {
            comment_id: comment.id.clone(),
        }
    }

    /// Parse a client supplied cursor string
    pub fn decode(raw: &str) -> Result<Self> {
        match raw.strip_prefix(CURSOR_PREFIX) {
            Some(id) if !id.is_empty() => Ok(Self {
                comment_id: id.to_string(),
            }),
            _ => Err(BlogError::InvalidCursor(raw.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        format!("{}{}", CURSOR_PREFIX, self.comment_id)
    }

    pub fn comment_id(&self) -> &str {
        &self.comment_id
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Sort comments into listing order
pub fn sort_comments(comments: &mut [Comment]) {
    comments.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Cut one page out of comments already in listing order.
///
/// Fails with `InvalidCursor` when `after` does not name one of `sorted`.
pub fn page_after(sorted: Vec<Comment>, after: Option<&Cursor>) -> Result<Vec<Comment>> {
    let start = match after {
        None => 0,
        Some(cursor) => {
            let index = sorted
                .iter()
                .position(|c| c.id == cursor.comment_id())
                .ok_or_else(|| BlogError::InvalidCursor(cursor.encode()))?;
            index + 1
        }
    };

    Ok(sorted
        .into_iter()
        .skip(start)
        .take(COMMENTS_PAGE_SIZE)
        .collect())
}
