//! Wire events exchanged with the host.
//!
//! Every event is a JSON object `{"event": name, "payload": {...}}` with
//! kebab-case names and camelCase payload fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events pushed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum HostEvent {
	/// Outcome of a host-mediated upload.
	UploadComplete {
		/// Correlation id from the matching `upload-by-url`.
		upload_id: String,
		/// Whether the host stored the image.
		success: bool,
		/// Public URL of the stored image.
		#[serde(default)]
		url: Option<String>,
		/// Alternative text.
		#[serde(default)]
		alt: Option<String>,
		/// Caption.
		#[serde(default)]
		caption: Option<String>,
		/// Failure reason when `success` is false.
		#[serde(default)]
		message: Option<String>,
	},
	/// A host-mediated upload failed.
	UploadError {
		/// Correlation id from the matching `upload-by-url`.
		upload_id: String,
		/// Failure reason.
		#[serde(default)]
		message: Option<String>,
	},
	/// Result of server-side content validation.
	ContentValidated {
		/// Whether the content passed validation.
		valid: bool,
		/// Validation messages.
		#[serde(default)]
		errors: Vec<String>,
	},
	/// The pending save was persisted.
	ContentSaved {
		/// Optional confirmation text.
		#[serde(default)]
		message: Option<String>,
	},
	/// The pending save was refused.
	SaveError {
		/// Failure reason.
		#[serde(default)]
		message: Option<String>,
	},
}

impl HostEvent {
	/// Wire name of the event.
	pub fn name(&self) -> &'static str {
		match self {
			Self::UploadComplete { .. } => "upload-complete",
			Self::UploadError { .. } => "upload-error",
			Self::ContentValidated { .. } => "content-validated",
			Self::ContentSaved { .. } => "content-saved",
			Self::SaveError { .. } => "save-error",
		}
	}
}

/// Events pushed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
	/// Ask the host to fetch and store a remote image.
	UploadByUrl {
		/// Correlation id echoed in the host's reply.
		upload_id: String,
		/// Image location.
		url: String,
	},
	/// User-initiated save.
	SaveContent {
		/// Serialized document.
		content: String,
		/// When the save was initiated.
		timestamp: DateTime<Utc>,
	},
	/// Debounced edit notification.
	ContentChanged {
		/// Serialized document.
		content: String,
	},
	/// Timer-initiated save.
	AutoSave {
		/// Serialized document.
		content: String,
	},
	/// A manual save was attempted on an empty document.
	EmptyContentWarning {},
	/// Ask the host to display a notification.
	ShowFlash {
		/// Notification style.
		#[serde(rename = "type")]
		kind: FlashKind,
		/// Notification text.
		message: String,
	},
}

impl ClientEvent {
	/// Wire name of the event.
	pub fn name(&self) -> &'static str {
		match self {
			Self::UploadByUrl { .. } => "upload-by-url",
			Self::SaveContent { .. } => "save-content",
			Self::ContentChanged { .. } => "content-changed",
			Self::AutoSave { .. } => "auto-save",
			Self::EmptyContentWarning {} => "empty-content-warning",
			Self::ShowFlash { .. } => "show-flash",
		}
	}

	/// Builds a success notification.
	pub fn success(message: impl Into<String>) -> Self {
		Self::ShowFlash {
			kind: FlashKind::Success,
			message: message.into(),
		}
	}

	/// Builds an error notification.
	pub fn error(message: impl Into<String>) -> Self {
		Self::ShowFlash {
			kind: FlashKind::Error,
			message: message.into(),
		}
	}
}

/// Style of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
	/// Positive confirmation.
	Success,
	/// Failure report.
	Error,
}
