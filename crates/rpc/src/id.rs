//! Correlation id generation.

use std::fmt;

use uuid::Uuid;

/// Simple counter-based sequence for ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct CounterIdGen(pub u64);

impl CounterIdGen {
	/// Creates a new counter starting at 0.
	#[must_use]
	pub const fn new() -> Self {
		Self(0)
	}

	/// Returns the current value and increments the counter.
	#[allow(clippy::should_implement_trait, reason = "convention")]
	pub fn next(&mut self) -> u64 {
		let id = self.0;
		self.0 += 1;
		id
	}
}

/// Opaque client-generated token matching a host reply to its request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorrelationId(String);

impl CorrelationId {
	/// Wraps an id received from the wire.
	pub fn from_wire(raw: impl Into<String>) -> Self {
		Self(raw.into())
	}

	/// Returns the wire representation.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for CorrelationId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Per-owner correlation id source.
///
/// Each generator draws a random scope once and appends a counter, so ids are
/// unique within a generator and never collide with another generator's ids.
#[derive(Debug, Clone)]
pub struct CorrelationIdGen {
	prefix: &'static str,
	scope: Uuid,
	counter: CounterIdGen,
}

impl CorrelationIdGen {
	/// Creates a generator with a fresh random scope.
	pub fn new(prefix: &'static str) -> Self {
		Self {
			prefix,
			scope: Uuid::new_v4(),
			counter: CounterIdGen::new(),
		}
	}

	/// Generates the next id.
	pub fn next_id(&mut self) -> CorrelationId {
		let seq = self.counter.next();
		CorrelationId(format!("{}_{}_{seq}", self.prefix, self.scope.simple()))
	}
}
