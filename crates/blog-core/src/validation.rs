//! Input validation applied by every backend before anything is persisted

use crate::error::{BlogError, Result};
use blog_types::{NewComment, NewPost};

/// Maximum comment length, in characters
pub const MAX_COMMENT_LENGTH: usize = 2000;

pub fn validate_new_post(post: &NewPost) -> Result<()> {
    require("title", &post.title)?;
    require("authorId", &post.author_id)?;
    Ok(())
}

pub fn validate_new_comment(comment: &NewComment) -> Result<()> {
    require("postId", &comment.post_id)?;
    require("authorId", &comment.author_id)?;
    require("text", &comment.text)?;

    let len = comment.text.chars().count();
    if len > MAX_COMMENT_LENGTH {
        return Err(BlogError::Validation(format!(
            "comment text exceeds {} characters (got {})",
            MAX_COMMENT_LENGTH, len
        )));
    }

    if let Some(parent_id) = &comment.parent_id {
        require("parentId", parent_id)?;
    }

    Ok(())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BlogError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
