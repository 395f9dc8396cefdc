//! # Error Types
//!
//! This module defines error types used throughout the vizdoc library.
//!
//! Only failures that callers must act on are errors. Malformed numbers,
//! unknown template variants and not-yet-ready capture sources are recovered
//! where they happen and never show up here.

use thiserror::Error;

/// Main error type for vizdoc operations
#[derive(Debug, Error)]
pub enum VizdocError {
    /// Raster allocation, decoding or encoding failed
    #[error("Image error: {0}")]
    Image(String),

    /// PDF assembly failed
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Fetching an image source failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Invalid configuration file or value
    #[error("Config error: {0}")]
    Config(String),

    /// A page of an export job could not be captured
    #[error("Capture of page {page} failed, nothing was exported")]
    Capture { page: usize },

    /// Another capture currently owns the source node
    #[error("Source node is already being captured")]
    CaptureInProgress,

    /// Export job is malformed (e.g. multiple pages into a PNG)
    #[error("Invalid export job: {0}")]
    InvalidJob(String),

    /// JSON payload or config parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
