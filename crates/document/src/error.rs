//! Error types for content conversion and validation.

use thiserror::Error;

/// Errors raised while converting or validating content.
#[derive(Debug, Error)]
pub enum ContentError {
	/// Text was not a well-formed document.
	#[error("malformed document: {0}")]
	Malformed(#[from] serde_json::Error),

	/// A block failed structural validation.
	#[error("block {index} is invalid: {reason}")]
	InvalidBlock {
		/// Position of the offending block.
		index: usize,
		/// What was wrong with it.
		reason: &'static str,
	},
}

/// Result type for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;
