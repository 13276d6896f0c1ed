//! Error types for the Halberd library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`HalberdError`] enum. The variants mirror the ways a caller can misuse the
//! index contract; none of them is transient, so none is worth retrying.
//!
//! # Examples
//!
//! ```
//! use halberd::error::{HalberdError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(HalberdError::invalid_argument("k must be at least 1"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Halberd operations.
#[derive(Error, Debug)]
pub enum HalberdError {
    /// A vector or scratch buffer does not have the configured dimensionality.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Non-positive K or search budget, or otherwise malformed input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Fewer documents are indexed than the query asked for.
    #[error("Insufficient data: requested {requested} hits but only {available} documents are indexed")]
    InsufficientData { requested: usize, available: usize },

    /// The oracle reported a zero distance, so a distance ratio is undefined.
    #[error("Degenerate query: oracle distance at rank {rank} is zero")]
    DegenerateQuery { rank: usize },

    /// I/O errors (vector files, output)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with HalberdError.
pub type Result<T> = std::result::Result<T, HalberdError>;

impl HalberdError {
    /// Create a new dimension mismatch error.
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        HalberdError::DimensionMismatch { expected, actual }
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        HalberdError::InvalidArgument(msg.into())
    }

    /// Create a new insufficient data error.
    pub fn insufficient_data(requested: usize, available: usize) -> Self {
        HalberdError::InsufficientData {
            requested,
            available,
        }
    }

    /// Create a new degenerate query error.
    pub fn degenerate_query(rank: usize) -> Self {
        HalberdError::DegenerateQuery { rank }
    }
}
