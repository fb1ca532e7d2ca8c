//! Input lines accepted on stdin.

use quire_bridge::HostEvent;
use quire_document::Block;
use serde::Deserialize;

/// Local actions standing in for the embedding page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
	/// The widget finished initializing.
	Ready,
	/// The user replaced the content with `blocks`.
	Change { blocks: Vec<Block> },
	/// The save button was pressed.
	Save,
	/// The autosave indicator was clicked.
	ToggleAutosave,
	/// An image URL was pasted.
	UploadUrl { url: String },
	/// Stop the session and exit.
	Quit,
}

/// One parsed stdin line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Line {
	Host(HostEvent),
	Command(Command),
}

/// Parses a line, returning `None` for blank lines.
pub fn parse(line: &str) -> Option<Result<Line, serde_json::Error>> {
	let line = line.trim();
	if line.is_empty() {
		return None;
	}
	Some(serde_json::from_str(line))
}
