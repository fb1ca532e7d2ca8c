//! Conversion between [`Document`] and transport text.

use crate::error::Result;
use crate::model::{Document, is_empty};

/// Persisted content after a lenient parse.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredContent {
	/// A well-formed, non-empty document.
	Document(Document),
	/// Nothing to load: blank text or an empty document.
	Empty,
	/// Text that is not a document; loaded as already-rendered markup.
	Markup(String),
}

/// Serializes a document to transport text.
pub fn serialize(document: &Document) -> Result<String> {
	Ok(serde_json::to_string(document)?)
}

/// Parses transport text into a document.
pub fn deserialize(text: &str) -> Result<Document> {
	Ok(serde_json::from_str(text)?)
}

/// Parses stored content without failing.
///
/// Malformed input is never an error here; it degrades to
/// [`StoredContent::Markup`] carrying the raw text.
pub fn parse_stored(text: &str) -> StoredContent {
	if text.trim().is_empty() {
		return StoredContent::Empty;
	}
	match deserialize(text) {
		Ok(document) if is_empty(&document) => StoredContent::Empty,
		Ok(document) => StoredContent::Document(document),
		Err(_) => StoredContent::Markup(text.to_string()),
	}
}
