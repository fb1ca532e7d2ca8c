use std::time::Duration;

use crate::timer::{ScheduledTask, Scheduler};
use crate::token::TaskId;

/// Delay-and-coalesce slot holding at most one armed [`ScheduledTask`].
///
/// Every [`Debouncer::restart`] replaces the armed task, so a burst of N
/// restarts inside the window yields a single fire. Fire notifications are
/// delivered asynchronously; the receiver calls [`Debouncer::take_if_current`]
/// to discard notifications from tasks that were replaced after they fired.
#[derive(Debug)]
pub struct Debouncer {
	delay: Duration,
	armed: Option<ScheduledTask>,
}

impl Debouncer {
	/// Creates an idle debouncer with the given quiet period.
	pub fn new(delay: Duration) -> Self {
		Self { delay, armed: None }
	}

	/// Returns the quiet period.
	pub const fn delay(&self) -> Duration {
		self.delay
	}

	/// Cancels any armed task and arms a new one.
	pub fn restart<F>(&mut self, scheduler: &Scheduler, f: F) -> TaskId
	where
		F: FnOnce(TaskId) + Send + 'static,
	{
		let task = scheduler.delay(self.delay, f);
		let id = task.id();
		if let Some(previous) = self.armed.replace(task) {
			previous.cancel();
		}
		id
	}

	/// Consumes a fire notification.
	///
	/// Returns true and disarms when `id` is the armed task; returns false for
	/// stale notifications.
	pub fn take_if_current(&mut self, id: TaskId) -> bool {
		match &self.armed {
			Some(task) if task.id() == id => {
				self.armed = None;
				true
			}
			_ => false,
		}
	}

	/// Returns true while a task is armed.
	pub fn is_armed(&self) -> bool {
		self.armed.is_some()
	}

	/// Cancels the armed task, if any.
	pub fn cancel(&mut self) {
		if let Some(task) = self.armed.take() {
			task.cancel();
		}
	}
}
