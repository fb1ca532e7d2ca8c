use std::time::Duration;

use thiserror::Error;

/// Errors raised by the correlation table itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationError {
	/// The id is still registered; ids must be fresh per request.
	#[error("correlation id {0} is already registered")]
	DuplicateId(String),
}

/// Result type for correlation table operations.
pub type Result<T> = std::result::Result<T, CorrelationError>;

/// Why a pending entry completed without a success payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection<E> {
	/// The remote side reported a failure.
	#[error("request failed")]
	Failed(E),
	/// No reply arrived before the deadline.
	#[error("request timed out after {0:?}")]
	TimedOut(Duration),
	/// The table was torn down while the request was pending.
	#[error("request cancelled: {0}")]
	Cancelled(String),
}

/// Completion value delivered to a pending request's receiver.
pub type Outcome<T, E> = std::result::Result<T, Rejection<E>>;
