//! Error types for the blog backend

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlogError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlogError {
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Connectivity or driver failure; only the relational backend produces it
    #[error("Database error: {0}")]
    Database(String),
}

impl BlogError {
    /// Stable machine-readable code, surfaced to API clients
    pub fn code(&self) -> &'static str {
        match self {
            BlogError::PostNotFound(_) | BlogError::CommentNotFound(_) => "NOT_FOUND",
            BlogError::Validation(_) => "VALIDATION_ERROR",
            BlogError::InvalidCursor(_) => "INVALID_CURSOR",
            BlogError::Database(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BlogError::PostNotFound(_) | BlogError::CommentNotFound(_)
        )
    }

    pub fn is_infrastructure(&self) -> bool {
        matches!(self, BlogError::Database(_))
    }
}

#[cfg(feature = "database")]
impl From<sqlx::Error> for BlogError {
    fn from(e: sqlx::Error) -> Self {
        BlogError::Database(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(BlogError::PostNotFound("p".into()).code(), "NOT_FOUND");
        assert_eq!(BlogError::CommentNotFound("c".into()).code(), "NOT_FOUND");
        assert_eq!(BlogError::Validation("v".into()).code(), "VALIDATION_ERROR");
        assert_eq!(BlogError::InvalidCursor("x".into()).code(), "INVALID_CURSOR");
        assert_eq!(BlogError::Database("io".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_display() {
        let err = BlogError::PostNotFound("post-9".into());
        assert_eq!(err.to_string(), "Post not found: post-9");
        assert!(err.is_not_found());
        assert!(!err.is_infrastructure());
    }
}
