//! Error types for copydown operations.
//!
//! Extraction and conversion degrade instead of failing. This enum covers
//! caller mistakes (an invalid selector or page URL) and failures of the
//! streaming rewriter.
//!
//! # Example
//!
//! ```rust
//! use copydown_core::{CopydownError, Document, ExtractConfig, extract_from_selector};
//!
//! let doc = Document::parse("<p>Hello</p>");
//! match extract_from_selector(&doc, "[[broken", &ExtractConfig::default()) {
//!     Err(CopydownError::HtmlParseError(msg)) => println!("bad selector: {}", msg),
//!     Ok(found) => println!("found: {}", found.is_some()),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Main error type for extraction and conversion operations.
#[derive(Error, Debug)]
pub enum CopydownError {
    /// HTML parsing errors.
    ///
    /// Returned when a CSS selector handed to the extractor cannot be parsed.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Invalid page URL.
    ///
    /// Returned when the URL attached to a [`crate::Document`] is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Streaming rewrite errors.
    ///
    /// Wraps failures reported by the `lol_html` rewriter while cleaning a subtree.
    #[error("Failed to rewrite HTML: {0}")]
    RewriteError(String),

    /// JSON serialization errors.
    #[error("Failed to serialize output: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<lol_html::errors::RewritingError> for CopydownError {
    fn from(err: lol_html::errors::RewritingError) -> Self {
        CopydownError::RewriteError(err.to_string())
    }
}

/// Result type alias for CopydownError.
pub type Result<T> = std::result::Result<T, CopydownError>;
