//! Business services

pub mod blog;

pub use blog::BlogService;
