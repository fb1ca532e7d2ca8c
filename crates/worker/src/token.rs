use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one scheduled task.
///
/// Ids come from a [`TaskClock`] and are never reused by that clock, so a
/// fire notification carrying a stale id can always be told apart from the
/// task currently armed in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "task#{}", self.0)
	}
}

/// Monotonic id source shared by every task a scheduler creates.
#[derive(Debug, Default, Clone)]
pub(crate) struct TaskClock {
	next: Arc<AtomicU64>,
}

impl TaskClock {
	/// Creates a new clock starting at id 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next task id.
	pub fn next(&self) -> TaskId {
		TaskId(self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}
}
