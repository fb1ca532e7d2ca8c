use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ContentError, Result};

/// Ordered sequence of content blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	/// Widget-side timestamp of the snapshot, in milliseconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub time: Option<i64>,
	/// Content blocks in display order.
	#[serde(default)]
	pub blocks: Vec<Block>,
	/// Widget format version that produced the snapshot.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub version: Option<String>,
}

impl Document {
	/// Creates a document from blocks with no timestamp or version.
	pub fn new(blocks: Vec<Block>) -> Self {
		Self {
			blocks,
			..Self::default()
		}
	}

	/// Compares block content, ignoring the snapshot timestamp.
	///
	/// Widgets restamp `time` on every snapshot, so two saves of identical
	/// content still differ field-wise.
	pub fn same_content(&self, other: &Self) -> bool {
		self.blocks == other.blocks && self.version == other.version
	}
}

/// One content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
	/// Widget-assigned block id.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	/// Block kind tag, e.g. `paragraph` or `image`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Kind-specific payload.
	#[serde(default)]
	pub data: Value,
}

impl Block {
	/// Creates a block without an id.
	pub fn new(kind: impl Into<String>, data: Value) -> Self {
		Self {
			id: None,
			kind: kind.into(),
			data,
		}
	}

	/// Returns true if the payload carries nothing: null, `{}` or `[]`.
	pub fn is_blank(&self) -> bool {
		match &self.data {
			Value::Null => true,
			Value::Object(map) => map.is_empty(),
			Value::Array(items) => items.is_empty(),
			_ => false,
		}
	}
}

/// Returns true when the document has no blocks or only blank blocks.
///
/// This is the single emptiness test used by manual save, autosave and the
/// empty-content warning.
pub fn is_empty(document: &Document) -> bool {
	document.blocks.iter().all(Block::is_blank)
}

/// Checks that every block has a kind tag and an object payload.
pub fn validate(document: &Document) -> Result<()> {
	for (index, block) in document.blocks.iter().enumerate() {
		if block.kind.trim().is_empty() {
			return Err(ContentError::InvalidBlock {
				index,
				reason: "missing block type",
			});
		}
		if !block.data.is_object() {
			return Err(ContentError::InvalidBlock {
				index,
				reason: "block data must be an object",
			});
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn no_blocks_is_empty() {
		assert!(is_empty(&Document::default()));
	}

	#[test]
	fn blank_payloads_are_empty() {
		let document = Document::new(vec![
			Block::new("paragraph", Value::Null),
			Block::new("paragraph", json!({})),
			Block::new("list", json!([])),
		]);
		assert!(is_empty(&document));
	}

	#[test]
	fn any_populated_block_is_content() {
		let document = Document::new(vec![
			Block::new("paragraph", json!({})),
			Block::new("paragraph", json!({ "text": "" })),
		]);
		assert!(!is_empty(&document));
	}

	#[test]
	fn validate_reports_first_bad_block() {
		let document = Document::new(vec![
			Block::new("paragraph", json!({ "text": "ok" })),
			Block::new("header", json!("not an object")),
			Block::new("", json!({})),
		]);
		match validate(&document) {
			Err(ContentError::InvalidBlock { index, .. }) => assert_eq!(index, 1),
			other => panic!("expected invalid block, got {other:?}"),
		}
	}

	#[test]
	fn validate_rejects_missing_kind() {
		let document = Document::new(vec![Block::new("  ", json!({ "text": "x" }))]);
		assert!(matches!(
			validate(&document),
			Err(ContentError::InvalidBlock { index: 0, reason: "missing block type" })
		));
	}

	#[test]
	fn same_content_ignores_timestamp() {
		let mut a = Document::new(vec![Block::new("paragraph", json!({ "text": "hi" }))]);
		let mut b = a.clone();
		a.time = Some(1);
		b.time = Some(2);
		assert!(a.same_content(&b));

		b.blocks[0].data = json!({ "text": "hello" });
		assert!(!a.same_content(&b));
	}
}
