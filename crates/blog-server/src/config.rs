//! Server configuration, from command-line flags or environment

use crate::storage::StorageKind;
use blog_core::DEFAULT_POSTS_LIMIT;
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "blog-server")]
#[command(author, version, about = "Blog backend with a GraphQL endpoint", long_about = None)]
pub struct Config {
    /// Storage backend
    #[arg(long, env = "BLOG_STORAGE", value_enum, default_value_t = StorageKind::InMemory)]
    pub storage: StorageKind,

    /// SQLite database url, used with `--storage sqlite`
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://data/blog.db")]
    pub database_url: String,

    /// Address the HTTP server binds to
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
    pub bind_address: String,

    /// Maximum number of posts returned by the `posts` query
    #[arg(long, env = "BLOG_POSTS_LIMIT", default_value_t = DEFAULT_POSTS_LIMIT)]
    pub posts_limit: usize,

    /// Deadline for executing a single GraphQL request
    #[arg(long, env = "BLOG_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["blog-server"]).unwrap();
        assert_eq!(config.storage, StorageKind::InMemory);
        assert_eq!(config.posts_limit, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_storage_selection() {
        let config = Config::try_parse_from([
            "blog-server",
            "--storage",
            "sqlite",
            "--database-url",
            "sqlite::memory:",
        ])
        .unwrap();
        assert_eq!(config.storage, StorageKind::Sqlite);
        assert_eq!(config.database_url, "sqlite::memory:");

        assert!(Config::try_parse_from(["blog-server", "--storage", "postgres"]).is_err());
    }
}
