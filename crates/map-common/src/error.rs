//! Error types for geo-viewer components.

use thiserror::Error;

/// Result type alias using ViewerError.
pub type ViewerResult<T> = Result<T, ViewerError>;

/// Primary error type for viewer operations.
///
/// None of these are fatal: each is contained by the operation that raised
/// it and reported through logging.
#[derive(Debug, Error)]
pub enum ViewerError {
    // === Data Access Errors ===
    #[error("Failed to fetch file listing: {0}")]
    ListingFetch(String),

    #[error("Failed to fetch '{file}': {message}")]
    ContentFetch { file: String, message: String },

    #[error("File not found: {0}")]
    NotFound(String),

    // === Decode Errors ===
    #[error("Failed to decode data: {0}")]
    Decode(String),

    // === Request Errors ===
    #[error("Unknown layer slot: {0}")]
    InvalidSlot(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ViewerError {
    /// Short machine-readable label, used as a metrics outcome.
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerError::ListingFetch(_) => "listing_fetch_error",
            ViewerError::ContentFetch { .. } | ViewerError::NotFound(_) => "content_fetch_error",
            ViewerError::Decode(_) => "decode_error",
            ViewerError::InvalidSlot(_) => "invalid_slot",
            ViewerError::Config(_) => "config_error",
            ViewerError::Io(_) => "io_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ViewerError::InvalidSlot(_) => 400,
            ViewerError::NotFound(_) => 404,
            ViewerError::Decode(_) => 422,
            ViewerError::ListingFetch(_) | ViewerError::ContentFetch { .. } => 502,
            _ => 500,
        }
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Decode(format!("JSON error: {}", err))
    }
}
