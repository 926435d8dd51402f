//! SQLite database layer (embedded, no external dependencies)

use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use blog_core::pagination::{Cursor, COMMENTS_PAGE_SIZE};
use blog_core::validation::{validate_new_comment, validate_new_post};
use blog_core::{
    BlogError, Comment, CommentStore, NewComment, NewPost, Post, PostStore, Result,
    DEFAULT_POSTS_LIMIT,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const COMMENT_COLUMNS: &str = "id, post_id, parent_id, author_id, text, created_at";

pub struct Database {
    pool: Arc<SqlitePool>,
    posts_limit: usize,
}

impl Database {
    /// Connect to `url` (`sqlite://path/to/file.db` or `sqlite::memory:`) and
    /// bring the schema up to date.
    pub async fn connect(url: &str) -> AnyResult<Self> {
        info!("Opening SQLite database at: {}", url);

        let in_memory = is_memory_url(url);

        if !in_memory {
            if let Some(parent) = file_path(url).and_then(|p| p.parent().map(|p| p.to_path_buf())) {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(&parent).await.with_context(|| {
                        format!("Failed to create database directory: {}", parent.display())
                    })?;
                }
            }
        }

        let mut options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url: {}", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(5));

        if in_memory {
            // Every connection to :memory: is its own database, so keep exactly
            // one alive for the lifetime of the pool.
            pool_options = pool_options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
            pool_options = pool_options.max_connections(5);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to SQLite database at: {}", url))?;

        info!("SQLite connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
            posts_limit: DEFAULT_POSTS_LIMIT,
        })
    }

    /// Private in-memory database, mostly for tests
    pub async fn in_memory() -> AnyResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    pub fn with_posts_limit(mut self, posts_limit: usize) -> Self {
        self.posts_limit = posts_limit;
        self
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Idempotent; safe to run on every start
    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author_id TEXT NOT NULL,
                allow_comments BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                post_id TEXT NOT NULL REFERENCES posts (id),
                parent_id TEXT REFERENCES comments (id),
                author_id TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts (created_at)")
            .execute(pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_comments_post_order ON comments (post_id, created_at, id)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn post_exists(&self, id: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM posts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn comment_in_post(&self, comment_id: &str, post_id: &str) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM comments WHERE id = ?1 AND post_id = ?2")
                .bind(comment_id)
                .bind(post_id)
                .fetch_optional(&*self.pool)
                .await?;

        Ok(row.is_some())
    }
}

#[async_trait]
impl PostStore for Database {
    async fn list_posts(&self) -> Result<Vec<Post>> {
        let rows: Vec<PostRow> = sqlx::query_as(
            r#"
            SELECT id, title, content, author_id, allow_comments, created_at
            FROM posts
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )
        .bind(self.posts_limit as i64)
        .fetch_all(&*self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn get_post(&self, id: &str) -> Result<Post> {
        let row: Option<PostRow> = sqlx::query_as(
            r#"
            SELECT id, title, content, author_id, allow_comments, created_at
            FROM posts WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(|r| r.into())
            .ok_or_else(|| BlogError::PostNotFound(id.to_string()))
    }

    async fn create_post(&self, post: NewPost) -> Result<Post> {
        validate_new_post(&post)?;

        let id = uuid::Uuid::now_v7().to_string();
        let created_at = Utc::now();

        let row: PostRow = sqlx::query_as(
            r#"
            INSERT INTO posts (id, title, content, author_id, allow_comments, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id, title, content, author_id, allow_comments, created_at
            "#,
        )
        .bind(&id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author_id)
        .bind(post.allow_comments)
        .bind(created_at)
        .fetch_one(&*self.pool)
        .await?;

        debug!("Inserted post {}", row.id);
        Ok(row.into())
    }
}

#[async_trait]
impl CommentStore for Database {
    async fn add_comment(&self, comment: NewComment) -> Result<Comment> {
        validate_new_comment(&comment)?;

        if !self.post_exists(&comment.post_id).await? {
            return Err(BlogError::PostNotFound(comment.post_id));
        }

        if let Some(parent_id) = &comment.parent_id {
            if !self.comment_in_post(parent_id, &comment.post_id).await? {
                return Err(BlogError::CommentNotFound(parent_id.clone()));
            }
        }

        let id = uuid::Uuid::now_v7().to_string();
        let created_at = Utc::now();

        let row: CommentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO comments ({COMMENT_COLUMNS})
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&comment.post_id)
        .bind(&comment.parent_id)
        .bind(&comment.author_id)
        .bind(&comment.text)
        .bind(created_at)
        .fetch_one(&*self.pool)
        .await?;

        debug!("Inserted comment {} on post {}", row.id, row.post_id);
        Ok(row.into())
    }

    async fn list_comments(&self, post_id: &str, after: Option<&Cursor>) -> Result<Vec<Comment>> {
        if !self.post_exists(post_id).await? {
            return Err(BlogError::PostNotFound(post_id.to_string()));
        }

        let rows: Vec<CommentRow> = match after {
            None => {
                sqlx::query_as(&format!(
                    r#"
                    SELECT {COMMENT_COLUMNS}
                    FROM comments
                    WHERE post_id = ?1
                    ORDER BY created_at ASC, id ASC
                    LIMIT ?2
                    "#
                ))
                .bind(post_id)
                .bind(COMMENTS_PAGE_SIZE as i64)
                .fetch_all(&*self.pool)
                .await?
            }
            Some(cursor) => {
                if !self.comment_in_post(cursor.comment_id(), post_id).await? {
                    return Err(BlogError::InvalidCursor(cursor.encode()));
                }

                // Resume strictly after the anchor's (created_at, id) key
                sqlx::query_as(&format!(
                    r#"
                    SELECT {COMMENT_COLUMNS}
                    FROM comments
                    WHERE post_id = ?1
                      AND (created_at, id) > (SELECT created_at, id FROM comments WHERE id = ?2)
                    ORDER BY created_at ASC, id ASC
                    LIMIT ?3
                    "#
                ))
                .bind(post_id)
                .bind(cursor.comment_id())
                .bind(COMMENTS_PAGE_SIZE as i64)
                .fetch_all(&*self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn latest_comment(&self, post_id: &str) -> Result<Option<Comment>> {
        let row: Option<CommentRow> = sqlx::query_as(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
            FROM comments
            WHERE post_id = ?1 AND parent_id IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(post_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn file_path(url: &str) -> Option<std::path::PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = rest.split('?').next()?;
    if path.is_empty() {
        None
    } else {
        Some(std::path::PathBuf::from(path))
    }
}

// Helper structs for sqlx query_as
#[derive(sqlx::FromRow)]
struct PostRow {
    id: String,
    title: String,
    content: String,
    author_id: String,
    allow_comments: bool,
    created_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(r: PostRow) -> Self {
        Post {
            id: r.id,
            title: r.title,
            content: r.content,
            author_id: r.author_id,
            allow_comments: r.allow_comments,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: String,
    post_id: String,
    parent_id: Option<String>,
    author_id: String,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            id: r.id,
            post_id: r.post_id,
            parent_id: r.parent_id,
            author_id: r.author_id,
            text: r.text,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_helpers() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite://file:blog?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite://data/blog.db"));

        assert_eq!(
            file_path("sqlite://data/blog.db?mode=rwc"),
            Some(std::path::PathBuf::from("data/blog.db"))
        );
        assert_eq!(
            file_path("sqlite:blog.db"),
            Some(std::path::PathBuf::from("blog.db"))
        );
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::in_memory().await.unwrap();
        Database::run_migrations(&db.pool).await.unwrap();
        Database::run_migrations(&db.pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_post_returns_persisted_row() {
        let db = Database::in_memory().await.unwrap();

        let created = db
            .create_post(NewPost::new("Test Post", "Test text", "user-1", true))
            .await
            .unwrap();
        let fetched = db.get_post(&created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert!(uuid::Uuid::parse_str(&created.id).is_ok());
    }

    #[tokio::test]
    async fn test_subsecond_timestamps_survive_round_trip() {
        let db = Database::in_memory().await.unwrap();
        let post = db
            .create_post(NewPost::new("T", "C", "u1", true))
            .await
            .unwrap();

        let first = db.add_comment(NewComment::new(&post.id, "u2", "a")).await.unwrap();
        let second = db.add_comment(NewComment::new(&post.id, "u2", "b")).await.unwrap();

        assert!(second.created_at > first.created_at);
        assert!(second.created_at - first.created_at < chrono::Duration::seconds(1));

        let listed = db.list_comments(&post.id, None).await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_driver_errors_are_infrastructure() {
        let db = Database::in_memory().await.unwrap();
        db.close().await;

        let err = db.list_posts().await.unwrap_err();
        assert!(err.is_infrastructure());
        assert_eq!(err.code(), "INTERNAL_ERROR");
    }

    fn temp_dir(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "blog_db_{}_{}",
            name,
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[tokio::test]
    async fn test_equal_timestamps_ordered_by_id() {
        let db = Database::in_memory().await.unwrap();
        let post = db
            .create_post(NewPost::new("T", "C", "u1", true))
            .await
            .unwrap();
        let created_at = Utc::now();

        for id in ["c-d", "c-a", "c-c", "c-b", "c-f", "c-e", "c-g"] {
            sqlx::query(
                "INSERT INTO comments (id, post_id, author_id, text, created_at) VALUES (?1, ?2, 'u2', 'same instant', ?3)",
            )
            .bind(id)
            .bind(&post.id)
            .bind(created_at)
            .execute(&*db.pool)
            .await
            .unwrap();
        }

        let mut ids = Vec::new();
        let mut cursor: Option<Cursor> = None;
        loop {
            let page = db.list_comments(&post.id, cursor.as_ref()).await.unwrap();
            let Some(last) = page.last() else { break };
            cursor = Some(Cursor::for_comment(last));
            ids.extend(page.into_iter().map(|c| c.id));
        }
        assert_eq!(ids, ["c-a", "c-b", "c-c", "c-d", "c-e", "c-f", "c-g"]);

        let latest = db.latest_comment(&post.id).await.unwrap().unwrap();
        assert_eq!(latest.id, "c-g");
    }

    #[tokio::test]
    async fn test_concurrent_writers_on_file_database() {
        let dir = temp_dir("concurrent");
        let url = format!("sqlite://{}", dir.join("blog.db").display());
        let db = Arc::new(Database::connect(&url).await.unwrap());
        let post = db
            .create_post(NewPost::new("T", "C", "u1", true))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let db = db.clone();
            let post_id = post.id.clone();
            handles.push(tokio::spawn(async move {
                db.add_comment(NewComment::new(post_id, "u2", format!("c{}", i)))
                    .await
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let comment = handle.await.unwrap().unwrap();
            assert!(ids.insert(comment.id));
        }

        let mut listed = std::collections::HashSet::new();
        let mut cursor: Option<Cursor> = None;
        loop {
            let page = db.list_comments(&post.id, cursor.as_ref()).await.unwrap();
            let Some(last) = page.last() else { break };
            cursor = Some(Cursor::for_comment(last));
            for comment in page {
                assert!(listed.insert(comment.id));
            }
        }
        assert_eq!(listed, ids);

        db.close().await;
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_file_database_persists_between_connections() {
        let dir = temp_dir("persist");
        let url = format!("sqlite://{}", dir.join("blog.db").display());

        let post = {
            let db = Database::connect(&url).await.unwrap();
            let post = db
                .create_post(NewPost::new("Persisted", "C", "u1", false))
                .await
                .unwrap();
            db.close().await;
            post
        };

        let db = Database::connect(&url).await.unwrap();
        let fetched = db.get_post(&post.id).await.unwrap();
        assert_eq!(fetched.title, "Persisted");
        assert!(!fetched.allow_comments);
        db.close().await;

        let _ = std::fs::remove_dir_all(&dir);
    }
}
