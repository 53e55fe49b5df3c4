//! Error types for the tripbill-core library.

use thiserror::Error;

/// Main error type for the tripbill library.
///
/// The computation modules (billing, tally, commission) are infallible by
/// design: bad input degrades to empty or clamped results. Errors only occur
/// at the explicit file-loading seams.
#[derive(Error, Debug)]
pub enum TripbillError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for the tripbill library.
pub type Result<T> = std::result::Result<T, TripbillError>;
