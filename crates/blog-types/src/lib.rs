//! Blog Types - Pure data definitions
//!
//! Posts and comments as stored and returned by every storage backend.
//! No async runtime or database dependencies live here.

pub mod comment;
pub mod post;

pub use comment::*;
pub use post::*;
