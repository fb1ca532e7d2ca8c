//! Delayed and periodic callbacks behind cancellable handles.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::token::{TaskClock, TaskId};
use crate::{TaskClass, spawn};

/// Shape of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
	/// Fires once after a delay.
	Debounce,
	/// Fires repeatedly with a fixed period.
	Interval,
}

/// Handle to a delayed or periodic callback.
///
/// Cancellation is cooperative and final: once [`ScheduledTask::cancel`] has
/// returned, the callback is never entered again. Dropping the handle cancels
/// the task, so replacing a stored handle is enough to disarm the old one.
#[derive(Debug)]
pub struct ScheduledTask {
	id: TaskId,
	kind: TaskKind,
	cancel: CancellationToken,
}

impl ScheduledTask {
	/// Returns the task id passed to the callback on every fire.
	pub const fn id(&self) -> TaskId {
		self.id
	}

	/// Returns whether this is a one-shot or periodic task.
	pub const fn kind(&self) -> TaskKind {
		self.kind
	}

	/// Stops the task. Idempotent.
	pub fn cancel(&self) {
		if !self.cancel.is_cancelled() {
			tracing::trace!(task = %self.id, kind = ?self.kind, "worker.timer.cancel");
			self.cancel.cancel();
		}
	}

	/// Returns true once the task has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}
}

impl Drop for ScheduledTask {
	fn drop(&mut self) {
		self.cancel.cancel();
	}
}

/// Factory for [`ScheduledTask`]s sharing one id clock.
///
/// Deadlines are computed when the task is scheduled, not when the spawned
/// future is first polled, so paused-clock tests observe exact timing.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
	clock: TaskClock,
	class: TaskClass,
}

impl Scheduler {
	/// Creates a scheduler whose tasks run with the given class.
	pub fn new(class: TaskClass) -> Self {
		Self {
			clock: TaskClock::new(),
			class,
		}
	}

	/// Runs `f` once after `after` unless cancelled first.
	pub fn delay<F>(&self, after: Duration, f: F) -> ScheduledTask
	where
		F: FnOnce(TaskId) + Send + 'static,
	{
		let id = self.clock.next();
		let cancel = CancellationToken::new();
		let token = cancel.clone();
		let deadline = Instant::now() + after;

		spawn(self.class, async move {
			tokio::select! {
				biased;
				() = token.cancelled() => {}
				() = tokio::time::sleep_until(deadline) => {
					if !token.is_cancelled() {
						f(id);
					}
				}
			}
		});

		tracing::trace!(task = %id, after_ms = after.as_millis() as u64, "worker.timer.delay");
		ScheduledTask {
			id,
			kind: TaskKind::Debounce,
			cancel,
		}
	}

	/// Runs `f` every `period`, first after one full period, until cancelled.
	///
	/// Missed ticks are delayed rather than bursted.
	pub fn interval<F>(&self, period: Duration, mut f: F) -> ScheduledTask
	where
		F: FnMut(TaskId) + Send + 'static,
	{
		let id = self.clock.next();
		let cancel = CancellationToken::new();
		let token = cancel.clone();
		let start = Instant::now() + period;

		spawn(self.class, async move {
			let mut ticker = tokio::time::interval_at(start, period);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				tokio::select! {
					biased;
					() = token.cancelled() => break,
					_ = ticker.tick() => {
						if token.is_cancelled() {
							break;
						}
						f(id);
					}
				}
			}
		});

		tracing::trace!(task = %id, period_ms = period.as_millis() as u64, "worker.timer.interval");
		ScheduledTask {
			id,
			kind: TaskKind::Interval,
			cancel,
		}
	}
}
