//! Persistent cover image cache.
//!
//! A durable key → image reference store backed by SQLite. Keys are
//! [`CoverKey`]s, values are the string form of [`CoverImage`] (remote URL or
//! inline data URI), so a cached inline cover keeps working offline.
//!
//! The pipeline talks to the cache through [`ImageCache`], which never fails:
//! when the database can't be opened the cache degrades to "every read is a
//! miss, every write is a no-op" and the pipeline runs in all-network mode.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::CoverKey;
use crate::model::CoverImage;

/// Default cache database filename.
pub const DEFAULT_CACHE_NAME: &str = "covers.db";

/// Errors raised by the cache's own API. The [`ImageCache`] view swallows them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cover cache is unavailable")]
    Unavailable,

    #[error("Cover cache database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to create cache directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),
}

/// Fail-soft async key/value view of an image cache.
#[async_trait]
pub trait ImageCache: Send + Sync {
    /// Cached image for a key, or `None` on a miss or any failure.
    async fn get(&self, key: &CoverKey) -> Option<CoverImage>;

    /// Store (or overwrite) the image for a key. Failures are logged.
    async fn put(&self, key: &CoverKey, image: &CoverImage);

    /// Drop the entry for a key. Failures are logged.
    async fn remove(&self, key: &CoverKey);
}

/// SQLite-backed cover cache.
#[derive(Debug, Clone)]
pub struct CoverCache {
    pool: Option<SqlitePool>,
}

impl CoverCache {
    /// Open (creating if needed) a cache database at `path`.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| CacheError::CreateDir(dir.to_path_buf(), e))?;
        }

        let url = format!("sqlite:{}", path.display());
        if !sqlx::Sqlite::database_exists(&url).await.unwrap_or(false) {
            sqlx::Sqlite::create_database(&url).await?;
        }

        let pool = SqlitePoolOptions::new().max_connections(2).connect(&url).await?;
        Self::with_pool(pool).await
    }

    /// Open a cache, falling back to the unavailable cache on failure.
    pub async fn open_or_unavailable(path: &Path) -> Self {
        match Self::open(path).await {
            Ok(cache) => cache,
            Err(e) => {
                tracing::warn!("Cover cache at {:?} unavailable, covers won't persist: {}", path, e);
                Self::unavailable()
            }
        }
    }

    /// A private in-memory cache (lives as long as this value).
    pub async fn in_memory() -> Result<Self, CacheError> {
        // Every connection to :memory: is its own database, so keep exactly one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    /// A cache that stores nothing.
    pub fn unavailable() -> Self {
        Self { pool: None }
    }

    /// Default location in the user cache directory.
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("music-shelf")
            .join(DEFAULT_CACHE_NAME)
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, CacheError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS images (
                key TEXT PRIMARY KEY NOT NULL,
                data TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool: Some(pool) })
    }

    pub fn is_available(&self) -> bool {
        self.pool.is_some()
    }

    fn pool(&self) -> Result<&SqlitePool, CacheError> {
        self.pool.as_ref().ok_or(CacheError::Unavailable)
    }

    /// Look up the raw entry for a key.
    pub async fn load(&self, key: &str) -> Result<Option<CoverImage>, CacheError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM images WHERE key = ?")
            .bind(key)
            .fetch_optional(self.pool()?)
            .await?;
        Ok(row.and_then(|(data,)| CoverImage::parse(&data)))
    }

    /// Insert or overwrite an entry.
    pub async fn store(&self, key: &str, image: &CoverImage) -> Result<(), CacheError> {
        sqlx::query(
            "INSERT INTO images (key, data) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data",
        )
        .bind(key)
        .bind(image.to_string())
        .execute(self.pool()?)
        .await?;
        Ok(())
    }

    /// Delete an entry. Returns whether anything was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let result = sqlx::query("DELETE FROM images WHERE key = ?")
            .bind(key)
            .execute(self.pool()?)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check if a key is cached.
    pub async fn contains(&self, key: &str) -> bool {
        matches!(self.load(key).await, Ok(Some(_)))
    }

    /// Number of cached entries.
    pub async fn count(&self) -> Result<i64, CacheError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
            .fetch_one(self.pool()?)
            .await?;
        Ok(count)
    }

    /// Total payload size in bytes.
    pub async fn size_bytes(&self) -> Result<i64, CacheError> {
        let size = sqlx::query_scalar::<_, i64>("SELECT COALESCE(SUM(LENGTH(data)), 0) FROM images")
            .fetch_one(self.pool()?)
            .await?;
        Ok(size)
    }

    /// Remove every entry.
    pub async fn clear(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM images").execute(self.pool()?).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ImageCache for CoverCache {
    async fn get(&self, key: &CoverKey) -> Option<CoverImage> {
        if !self.is_available() {
            return None;
        }
        match self.load(key.as_str()).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("Cover cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn put(&self, key: &CoverKey, image: &CoverImage) {
        if !self.is_available() {
            return;
        }
        if let Err(e) = self.store(key.as_str(), image).await {
            tracing::warn!("Cover cache write failed for {}: {}", key, e);
        }
    }

    async fn remove(&self, key: &CoverKey) {
        if !self.is_available() {
            return;
        }
        if let Err(e) = self.delete(key.as_str()).await {
            tracing::warn!("Cover cache delete failed for {}: {}", key, e);
        }
    }
}
