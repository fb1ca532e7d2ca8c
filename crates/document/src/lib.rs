//! Block document model and transport serialization.
//!
//! Content crosses the host channel as JSON text. This crate owns both ends of
//! that conversion plus the emptiness predicate that gates every save path:
//! * [`Document`] / [`Block`]: ordered blocks with a kind tag and opaque data
//! * [`serialize`] / [`deserialize`]: strict text conversion
//! * [`parse_stored`]: lenient parse of persisted content, degrading to markup
//! * [`is_empty`] / [`validate`]: checks applied before content leaves the client

#![warn(missing_docs)]

mod error;
mod model;
mod serial;

pub use error::{ContentError, Result};
pub use model::{Block, Document, is_empty, validate};
pub use serial::{StoredContent, deserialize, parse_stored, serialize};
