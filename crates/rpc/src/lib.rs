//! Request/response correlation for event channels without request framing.
//!
//! The remote side only exchanges named events, so matching a reply to the
//! call that caused it is layered on top with caller-generated ids:
//! * [`CorrelationIdGen`]: per-owner source of unique [`CorrelationId`]s
//! * [`CorrelationTable`]: pending continuations with per-entry deadlines
//! * [`Rejection`]: the non-success completions (failure, timeout, cancel)

#![warn(missing_docs)]

mod error;
mod id;
mod table;

pub use error::{CorrelationError, Outcome, Rejection, Result};
pub use id::{CorrelationId, CorrelationIdGen, CounterIdGen};
pub use table::{CorrelationTable, ExpiryNotifier, PendingReply};
