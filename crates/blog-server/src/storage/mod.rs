//! Storage layer
//!
//! Two interchangeable implementations of the `BlogStore` contract:
//! an in-memory store behind one mutex, and SQLite (embedded) via sqlx.

pub mod db;
pub mod memory;

pub use db::Database;
pub use memory::MemoryStore;

use anyhow::Result;
use blog_core::BlogStore;
use std::sync::Arc;

/// Which backend the server runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageKind {
    #[value(name = "inmemory", alias = "memory")]
    InMemory,
    #[value(name = "sqlite", alias = "db")]
    Sqlite,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::InMemory => write!(f, "inmemory"),
            StorageKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// An opened backend, kept concrete so shutdown can close the pool
pub enum Backend {
    Memory(Arc<MemoryStore>),
    Sqlite(Arc<Database>),
}

impl Backend {
    pub async fn open(kind: StorageKind, database_url: &str, posts_limit: usize) -> Result<Self> {
        match kind {
            StorageKind::InMemory => Ok(Backend::Memory(Arc::new(MemoryStore::with_posts_limit(
                posts_limit,
            )))),
            StorageKind::Sqlite => {
                let db = Database::connect(database_url)
                    .await?
                    .with_posts_limit(posts_limit);
                Ok(Backend::Sqlite(Arc::new(db)))
            }
        }
    }

    pub fn store(&self) -> Arc<dyn BlogStore> {
        match self {
            Backend::Memory(store) => store.clone() as Arc<dyn BlogStore>,
            Backend::Sqlite(db) => db.clone() as Arc<dyn BlogStore>,
        }
    }

    pub async fn close(&self) {
        if let Backend::Sqlite(db) = self {
            db.close().await;
        }
    }
}
