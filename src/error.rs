// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Everything the ingestion pipeline can fail with.
///
/// `RowParse` and `CorruptArchive` are recovered inside the cache (the row or
/// archive is skipped and logged); the rest reach the caller.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("fetch error for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error writing archive {path}: {source}")]
    ArchiveWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt archive {path}: {reason}")]
    CorruptArchive { path: PathBuf, reason: String },

    #[error("row {row}: {reason}")]
    RowParse { row: u64, reason: String },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("cache I/O error on {path}: {reason}")]
    CacheIo { path: PathBuf, reason: String },

    #[error("unknown region code `{0}`")]
    UnknownRegion(String),

    #[error("no usable archives in {0}")]
    NoArchives(PathBuf),

    #[error("configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub(crate) fn cache_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CacheIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorruptArchive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
