//! Error types shared by the sync pipeline.
//!
//! Every error that can happen while handling a single component is caught at
//! the component boundary and logged; none of them aborts a run. Setup errors
//! (`ConfigError`, `EnumerateError`) are the only ones surfaced to the caller.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the remote translation service.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("http client error: {0}")]
    Client(String),

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{0}")]
    Status(String),

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

/// Local translation cache failures.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache read failed for {slug}: {source}")]
    Read {
        slug: String,
        #[source]
        source: io::Error,
    },

    #[error("cache entry for {slug} is not a translation mapping: {source}")]
    Decode {
        slug: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache write failed for {slug}: {source}")]
    Write {
        slug: String,
        #[source]
        source: io::Error,
    },
}

/// The selected translation is not a JSON list of records.
#[derive(Debug, Error)]
#[error("{language} payload is not a list of records: {source}")]
pub struct FormatError {
    pub language: String,
    pub payload: String,
    #[source]
    pub source: serde_json::Error,
}

/// The tree builder rejected a component, or a component file is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("{slug}: parent {parent} has not been built")]
    MissingParent { slug: String, parent: String },

    #[error("{slug}: expected {expected} record(s), found {found}")]
    RecordCount {
        slug: String,
        expected: usize,
        found: usize,
    },

    #[error("{slug}: record {index} is missing `{field}`")]
    MissingField {
        slug: String,
        index: usize,
        field: &'static str,
    },

    #[error("no records found")]
    Empty,
}

/// Writing one tree node failed.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", path.display())]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// The source content tree could not be listed.
#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("no content for language `{language}` under {}", root.display())]
    MissingLanguage { language: String, root: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Why a single component was dropped from a run.
#[derive(Debug, Error)]
pub enum ComponentError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("{0} not found")]
    MissingLanguage(String),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
