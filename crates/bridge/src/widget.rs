//! The editing widget as seen by a session.

use std::sync::Arc;

use parking_lot::Mutex;
use quire_document::{Block, Document, StoredContent};

use crate::error::{Error, Result};

/// An editing widget owned by exactly one session.
///
/// Rendering and input handling stay on the widget side; the session only
/// loads content, snapshots it for saving and releases the widget on teardown.
/// Lifecycle and change notifications reach the session as
/// [`WidgetEvent`](crate::WidgetEvent)s.
pub trait Widget: Send {
	/// Replaces the widget's content.
	fn load(&mut self, content: StoredContent) -> Result<()>;

	/// Captures the current content.
	fn snapshot(&mut self) -> Result<Document>;

	/// Releases the widget. Called once, last, during teardown.
	fn destroy(&mut self);
}

#[derive(Debug, Default)]
struct MemoryState {
	document: Document,
	markup: Option<String>,
	fail_snapshots: bool,
	destroyed: bool,
}

/// Headless widget keeping its content in memory.
///
/// Clones share state, so a caller can keep a clone to edit content after
/// handing the widget to a session.
#[derive(Debug, Clone, Default)]
pub struct MemoryWidget {
	state: Arc<Mutex<MemoryState>>,
}

impl MemoryWidget {
	/// Creates an empty widget.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the blocks, as a user edit would.
	pub fn set_blocks(&self, blocks: Vec<Block>) {
		let mut state = self.state.lock();
		state.document.blocks = blocks;
		state.markup = None;
	}

	/// Returns the current document.
	pub fn document(&self) -> Document {
		self.state.lock().document.clone()
	}

	/// Returns markup loaded from non-document stored content.
	pub fn markup(&self) -> Option<String> {
		self.state.lock().markup.clone()
	}

	/// Makes subsequent snapshots fail.
	pub fn fail_snapshots(&self, fail: bool) {
		self.state.lock().fail_snapshots = fail;
	}

	/// Returns true once the owning session released the widget.
	pub fn is_destroyed(&self) -> bool {
		self.state.lock().destroyed
	}
}

impl Widget for MemoryWidget {
	fn load(&mut self, content: StoredContent) -> Result<()> {
		let mut state = self.state.lock();
		if state.destroyed {
			return Err(Error::Widget("widget destroyed".into()));
		}
		match content {
			StoredContent::Document(document) => {
				state.document = document;
				state.markup = None;
			}
			StoredContent::Empty => {
				state.document = Document::default();
				state.markup = None;
			}
			StoredContent::Markup(markup) => {
				state.document = Document::default();
				state.markup = Some(markup);
			}
		}
		Ok(())
	}

	fn snapshot(&mut self) -> Result<Document> {
		let state = self.state.lock();
		if state.destroyed {
			return Err(Error::Widget("widget destroyed".into()));
		}
		if state.fail_snapshots {
			return Err(Error::Widget("snapshot failed".into()));
		}
		Ok(state.document.clone())
	}

	fn destroy(&mut self) {
		self.state.lock().destroyed = true;
	}
}
