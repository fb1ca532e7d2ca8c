//! Error types for the bridge.

use std::time::Duration;

use quire_document::ContentError;
use quire_rpc::{CorrelationError, Rejection};
use thiserror::Error;

/// Errors surfaced by session operations.
///
/// None of these are fatal to the session: each fails only the operation that
/// raised it.
#[derive(Debug, Error)]
pub enum Error {
	/// Local validation failed; the host was not contacted.
	#[error("invalid input: {0}")]
	InvalidInput(String),

	/// The upload endpoint or host reported a failure.
	#[error("transfer failed: {message}")]
	Transfer {
		/// Transport status, when the failure came from the transport.
		status: Option<u16>,
		/// Reason reported by the remote side.
		message: String,
	},

	/// No reply arrived in time.
	#[error("timed out after {0:?}")]
	Timeout(Duration),

	/// A correlation id was registered twice.
	#[error("duplicate correlation id {0}")]
	DuplicateId(String),

	/// The session was torn down while the operation was pending.
	#[error("cancelled: {0}")]
	Cancelled(String),

	/// A manual save was refused locally.
	#[error("save rejected: {0}")]
	SaveRejected(SaveRejection),

	/// The widget failed to produce or accept content.
	#[error("widget error: {0}")]
	Widget(String),

	/// Content failed to serialize or validate.
	#[error(transparent)]
	Content(#[from] ContentError),

	/// The host channel is gone.
	#[error("host channel closed")]
	ChannelClosed,

	/// A configuration file could not be parsed.
	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),
}

impl Error {
	/// Text suitable for a user-facing flash notification.
	pub fn user_message(&self) -> String {
		match self {
			Self::InvalidInput(message) | Self::Widget(message) => message.clone(),
			Self::Transfer { message, .. } => message.clone(),
			Self::Timeout(_) => "Upload timed out".to_string(),
			Self::Content(_) => "Invalid content format".to_string(),
			other => other.to_string(),
		}
	}
}

impl From<CorrelationError> for Error {
	fn from(err: CorrelationError) -> Self {
		match err {
			CorrelationError::DuplicateId(id) => Self::DuplicateId(id),
		}
	}
}

impl From<Rejection<Error>> for Error {
	fn from(rejection: Rejection<Error>) -> Self {
		match rejection {
			Rejection::Failed(err) => err,
			Rejection::TimedOut(after) => Self::Timeout(after),
			Rejection::Cancelled(reason) => Self::Cancelled(reason),
		}
	}
}

/// Why a manual save was refused without contacting the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SaveRejection {
	/// The widget has not finished initializing.
	#[error("editor is not ready")]
	NotReady,
	/// Another save is awaiting acknowledgement.
	#[error("a save is already in flight")]
	InFlight,
	/// Nothing changed since the last save.
	#[error("no unsaved changes")]
	NothingToSave,
	/// The document is empty; an empty-content warning was sent instead.
	#[error("content is empty")]
	EmptyContent,
	/// No save control was provided, so manual saving is disabled.
	#[error("save control unavailable")]
	Unavailable,
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;
