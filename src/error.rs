//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror`
//! ([`EnrichmentError`](crate::enrichment::EnrichmentError),
//! [`CacheError`](crate::cover::CacheError)), which convert into the
//! top-level [`Error`]. The CLI uses `anyhow` on top.
//!
//! Nothing in the cover pipeline surfaces these to the listener: source and
//! cache failures are logged and swallowed. Only library loads and the CLI
//! return them.

use std::path::PathBuf;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cover cache error
    #[error("Cache error: {0}")]
    Cache(#[from] crate::cover::CacheError),

    /// Artwork source error
    #[error("Enrichment error: {0}")]
    Enrichment(#[from] crate::enrichment::EnrichmentError),

    /// Library could not be loaded from the server
    #[error("Library error: {0}")]
    Library(String),

    /// File not found
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a library load error.
    pub fn library(message: impl Into<String>) -> Self {
        Self::Library(message.into())
    }

    /// Create a not found error.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, crate::cover::CacheError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Cache(e).context(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::CacheError;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("/music/a.mp3");
        assert!(err.to_string().contains("/music/a.mp3"));
    }

    #[test]
    fn test_library_error_with_context() {
        let err = Error::library("GET /api/all-metadata returned 500").context("while reloading");
        let msg = err.to_string();
        assert!(msg.contains("while reloading"));
        assert!(msg.contains("all-metadata"));
    }

    #[test]
    fn test_cache_error_converts() {
        let err: Error = CacheError::Unavailable.into();
        assert!(matches!(err, Error::Cache(CacheError::Unavailable)));
    }

    #[test]
    fn test_result_ext() {
        let result: std::result::Result<(), CacheError> = Err(CacheError::Unavailable);
        let with_ctx = result.with_context("reading cache stats");
        assert!(with_ctx.unwrap_err().to_string().contains("reading cache stats"));
    }
}
