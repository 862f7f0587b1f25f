//! Catalog error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the ingestion pipeline and the catalog store
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Playlist file missing or unreadable
    #[error("playlist source unavailable at {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot file could not be written or decoded
    #[error("snapshot error at {path}: {message}")]
    Snapshot { path: PathBuf, message: String },

    /// Constraint violation during a bulk import (transaction rolled back)
    #[error("import conflict: {0}")]
    ImportConflict(#[source] sqlx::Error),

    /// Query issued before the first successful import
    #[error("catalog is not ready yet")]
    NotReady,

    /// Client input the façade cannot serve
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl CatalogError {
    /// Whether the caller may retry the same request later
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::NotReady)
    }

    /// Classify a database error raised while importing
    pub fn from_import(err: sqlx::Error) -> Self {
        let is_constraint = err
            .as_database_error()
            .map(|db| {
                !matches!(db.kind(), sqlx::error::ErrorKind::Other)
            })
            .unwrap_or(false);

        if is_constraint {
            CatalogError::ImportConflict(err)
        } else {
            CatalogError::Storage(err)
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
