//! Pending request table keyed by caller-generated ids.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use quire_worker::{ScheduledTask, Scheduler};
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::error::{CorrelationError, Outcome, Rejection, Result};

/// Callback invoked from a timer task when an entry's deadline passes.
///
/// The callback must not touch the table directly; it only notifies the
/// table's owner, which then calls [`CorrelationTable::expire`].
pub type ExpiryNotifier<Id> = Arc<dyn Fn(Id) + Send + Sync>;

/// Receiver side of a pending request.
pub type PendingReply<T, E> = oneshot::Receiver<Outcome<T, E>>;

struct PendingEntry<T, E> {
	responder: oneshot::Sender<Outcome<T, E>>,
	created_at: Instant,
	timeout: Duration,
	/// Dropping the entry cancels its deadline.
	_deadline: ScheduledTask,
}

impl<T, E> PendingEntry<T, E> {
	fn deadline(&self) -> Instant {
		self.created_at + self.timeout
	}
}

/// Maps outstanding request ids to their continuations.
///
/// Every registered id completes exactly once: through [`resolve`],
/// [`reject`], [`expire`] or [`cancel_all`]. The entry is removed on
/// completion, so any later attempt for the same id is a logged no-op.
///
/// [`resolve`]: CorrelationTable::resolve
/// [`reject`]: CorrelationTable::reject
/// [`expire`]: CorrelationTable::expire
/// [`cancel_all`]: CorrelationTable::cancel_all
pub struct CorrelationTable<Id, T, E> {
	entries: HashMap<Id, PendingEntry<T, E>>,
	scheduler: Scheduler,
	on_expire: ExpiryNotifier<Id>,
}

impl<Id, T, E> fmt::Debug for CorrelationTable<Id, T, E>
where
	Id: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CorrelationTable")
			.field("pending", &self.entries.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl<Id, T, E> CorrelationTable<Id, T, E>
where
	Id: Eq + Hash + Clone + fmt::Display + Send + 'static,
{
	/// Creates an empty table whose deadlines report through `on_expire`.
	pub fn new(scheduler: Scheduler, on_expire: ExpiryNotifier<Id>) -> Self {
		Self {
			entries: HashMap::new(),
			scheduler,
			on_expire,
		}
	}

	/// Registers `id` and starts its deadline timer.
	///
	/// The returned receiver yields the outcome exactly once.
	pub fn register(&mut self, id: Id, timeout: Duration) -> Result<PendingReply<T, E>> {
		if self.entries.contains_key(&id) {
			tracing::error!(id = %id, "correlation id registered twice");
			return Err(CorrelationError::DuplicateId(id.to_string()));
		}

		let (responder, reply) = oneshot::channel();
		let notify = self.on_expire.clone();
		let expiring = id.clone();
		let deadline = self.scheduler.delay(timeout, move |_| notify(expiring));

		tracing::debug!(id = %id, timeout_ms = timeout.as_millis() as u64, "correlation.register");
		self.entries.insert(
			id,
			PendingEntry {
				responder,
				created_at: Instant::now(),
				timeout,
				_deadline: deadline,
			},
		);
		Ok(reply)
	}

	/// Completes `id` with a success payload.
	///
	/// Returns false and logs a warning when the id is not pending.
	pub fn resolve(&mut self, id: &Id, payload: T) -> bool {
		self.complete(id, Ok(payload), "resolve")
	}

	/// Completes `id` with a failure.
	///
	/// Returns false and logs a warning when the id is not pending.
	pub fn reject(&mut self, id: &Id, error: E) -> bool {
		self.complete(id, Err(Rejection::Failed(error)), "reject")
	}

	/// Completes `id` with [`Rejection::TimedOut`] if its deadline has passed.
	///
	/// Expiry notifications for ids that already completed are ignored.
	pub fn expire(&mut self, id: &Id) -> bool {
		let Some(entry) = self.entries.get(id) else {
			tracing::debug!(id = %id, "correlation.expire for completed id");
			return false;
		};
		if Instant::now() < entry.deadline() {
			tracing::debug!(id = %id, "correlation.expire before deadline ignored");
			return false;
		}
		let timeout = entry.timeout;
		tracing::warn!(id = %id, timeout_ms = timeout.as_millis() as u64, "correlation deadline exceeded");
		self.complete(id, Err(Rejection::TimedOut(timeout)), "expire")
	}

	/// Rejects every pending entry with [`Rejection::Cancelled`] and clears the
	/// table. Returns the number of entries cancelled.
	pub fn cancel_all(&mut self, reason: &str) -> usize {
		let count = self.entries.len();
		for (id, entry) in self.entries.drain() {
			tracing::debug!(id = %id, reason, "correlation.cancel");
			let _ = entry.responder.send(Err(Rejection::Cancelled(reason.to_string())));
		}
		if count > 0 {
			tracing::info!(count, reason, "cancelled pending correlations");
		}
		count
	}

	/// Returns true if `id` is pending.
	pub fn contains(&self, id: &Id) -> bool {
		self.entries.contains_key(id)
	}

	/// Returns the deadline of a pending id.
	pub fn deadline(&self, id: &Id) -> Option<Instant> {
		self.entries.get(id).map(PendingEntry::deadline)
	}

	/// Returns the number of pending entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true when nothing is pending.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	fn complete(&mut self, id: &Id, outcome: Outcome<T, E>, op: &'static str) -> bool {
		let Some(entry) = self.entries.remove(id) else {
			tracing::warn!(id = %id, op, "no pending request for id; late or duplicate reply ignored");
			return false;
		};
		let elapsed = entry.created_at.elapsed();
		if entry.responder.send(outcome).is_err() {
			tracing::debug!(id = %id, op, "pending request receiver dropped");
		}
		tracing::debug!(id = %id, op, elapsed_ms = elapsed.as_millis() as u64, "correlation.complete");
		true
	}
}

#[cfg(test)]
mod tests;
