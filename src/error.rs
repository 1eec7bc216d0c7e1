//! Error types for br library operations.
//!
//! All fallible library functions return [`Result`], whose error type is
//! [`BrError`]. Variants either carry domain context (missing metadata,
//! checksum mismatch) or wrap the underlying library error via `#[from]`.
//! Worker-level failures are reported per package by the install engine and
//! never abort sibling workers; the one exception is
//! [`ResolutionMissingMetadata`](BrError::ResolutionMissingMetadata), which
//! aborts the whole invocation before anything is downloaded.

use thiserror::Error;

/// Error type for all br library operations.
#[derive(Error, Debug)]
pub enum BrError {
    /// The host OS cannot be mapped to a bottle flavor.
    #[error("unsupported operating system")]
    UnsupportedPlatform,

    /// Metadata was absent (404 or exhausted retries) for a package that the
    /// caller required to exist.
    #[error("metadata not found for: {0}")]
    MetadataAbsent(String),

    /// Dependency resolution visited a package with no usable metadata.
    /// Aborts the entire install invocation; a partial plan could install a
    /// dependency without its dependent.
    #[error("resolution failed, metadata missing for: {0}")]
    ResolutionMissingMetadata(String),

    /// Downloaded tarball did not hash to the digest the registry promised.
    /// The tarball has already been deleted when this is raised.
    #[error("SHA256 mismatch for {0}")]
    IntegrityMismatch(String),

    /// Network or HTTP request failure from the registry or GHCR.
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    /// Failed to parse JSON from the API or a local state file.
    #[error("failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Metadata cache backing store failure.
    #[error("cache error: {0}")]
    CacheError(#[from] rusqlite::Error),

    /// File system operation failed (Cellar, bin dir, inventory, downloads).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Miscellaneous error with context from `anyhow`.
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BrError>;
