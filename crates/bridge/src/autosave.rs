//! Autosave scheduling and the emit guard.
//!
//! Two triggers share one guard: a debounce restarted by every change, and an
//! independent periodic tick. Either trigger emits only when the content is
//! non-empty and differs from the last snapshot the host has seen, so
//! identical content is never emitted twice in a row.

use quire_document::{Document, is_empty};
use quire_worker::{Debouncer, ScheduledTask, Scheduler, TaskId};

use crate::config::AutosaveConfig;

/// Outcome of evaluating the autosave guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveDecision {
	/// Emit `auto-save` with the evaluated content.
	Emit,
	/// Do nothing.
	Skip(SkipReason),
}

/// Why an autosave evaluation emitted nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	/// Autosave is switched off.
	Disabled,
	/// The document is empty.
	Empty,
	/// The document matches the last snapshot.
	Unchanged,
}

/// Owns the autosave timers and the last snapshot sent to the host.
#[derive(Debug)]
pub struct AutosaveCoordinator {
	config: AutosaveConfig,
	enabled: bool,
	debouncer: Debouncer,
	ticker: Option<ScheduledTask>,
	snapshot: Option<Document>,
}

impl AutosaveCoordinator {
	/// Creates an idle coordinator; no timer runs until a change arrives or
	/// [`start_ticker`](Self::start_ticker) is called.
	pub fn new(config: AutosaveConfig) -> Self {
		Self {
			enabled: config.enabled,
			debouncer: Debouncer::new(config.debounce()),
			ticker: None,
			snapshot: None,
			config,
		}
	}

	/// Whether autosave currently runs.
	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Whether the user may switch autosave on and off.
	pub fn is_toggleable(&self) -> bool {
		self.config.toggleable
	}

	/// Whether a debounce elapsing should evaluate an autosave.
	pub fn saves_on_change(&self) -> bool {
		self.enabled && self.config.save_on_change
	}

	/// Switches autosave on or off. Turning it off cancels the tick; a pending
	/// debounce still fires but no longer passes the guard.
	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
		if !enabled && let Some(task) = self.ticker.take() {
			task.cancel();
		}
	}

	/// Restarts the change debounce. Earlier pending fires become stale.
	pub fn restart_debounce<F>(&mut self, scheduler: &Scheduler, on_fire: F) -> TaskId
	where
		F: FnOnce(TaskId) + Send + 'static,
	{
		let id = self.debouncer.restart(scheduler, on_fire);
		tracing::debug!(task = %id, delay_ms = self.config.debounce_ms, "autosave.debounce");
		id
	}

	/// Consumes a debounce fire. False for stale or cancelled fires.
	pub fn accept_debounce(&mut self, id: TaskId) -> bool {
		self.debouncer.take_if_current(id)
	}

	/// Starts the periodic tick, replacing any running one.
	pub fn start_ticker<F>(&mut self, scheduler: &Scheduler, on_tick: F) -> TaskId
	where
		F: FnMut(TaskId) + Send + 'static,
	{
		let task = scheduler.interval(self.config.interval(), on_tick);
		let id = task.id();
		tracing::debug!(task = %id, period_ms = self.config.interval_ms, "autosave.ticker.start");
		self.ticker = Some(task);
		id
	}

	/// Whether `id` is the running tick.
	pub fn accept_tick(&self, id: TaskId) -> bool {
		self.ticker.as_ref().is_some_and(|task| task.id() == id)
	}

	/// Whether the periodic tick is running.
	pub fn is_ticking(&self) -> bool {
		self.ticker.is_some()
	}

	/// Cancels the debounce and the tick.
	pub fn stop(&mut self) {
		self.debouncer.cancel();
		if let Some(task) = self.ticker.take() {
			task.cancel();
		}
	}

	/// Applies the emit guard to `document`.
	pub fn decide(&self, document: &Document) -> AutosaveDecision {
		if !self.enabled {
			AutosaveDecision::Skip(SkipReason::Disabled)
		} else if is_empty(document) {
			AutosaveDecision::Skip(SkipReason::Empty)
		} else if !self.differs(document) {
			AutosaveDecision::Skip(SkipReason::Unchanged)
		} else {
			AutosaveDecision::Emit
		}
	}

	/// Whether `document` differs from the last snapshot.
	pub fn differs(&self, document: &Document) -> bool {
		self.snapshot.as_ref().is_none_or(|last| !last.same_content(document))
	}

	/// Records `document` as seen by the host, returning the previous snapshot.
	pub fn record(&mut self, document: Document) -> Option<Document> {
		self.snapshot.replace(document)
	}

	/// Restores a snapshot returned by [`record`](Self::record) after the
	/// host refused the save.
	pub fn restore(&mut self, previous: Option<Document>) {
		self.snapshot = previous;
	}

	/// The last snapshot seen by the host.
	pub fn snapshot(&self) -> Option<&Document> {
		self.snapshot.as_ref()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use quire_document::Block;
	use serde_json::json;
	use tokio::sync::mpsc;

	use super::*;

	fn text(body: &str) -> Document {
		Document::new(vec![Block::new("paragraph", json!({ "text": body }))])
	}

	async fn settle() {
		for _ in 0..4 {
			tokio::task::yield_now().await;
		}
	}

	#[test]
	fn guard_skips_empty_and_unchanged() {
		let mut autosave = AutosaveCoordinator::new(AutosaveConfig::default());

		assert_eq!(autosave.decide(&Document::default()), AutosaveDecision::Skip(SkipReason::Empty));
		assert_eq!(autosave.decide(&text("a")), AutosaveDecision::Emit);

		autosave.record(text("a"));
		assert_eq!(autosave.decide(&text("a")), AutosaveDecision::Skip(SkipReason::Unchanged));
		assert_eq!(autosave.decide(&text("b")), AutosaveDecision::Emit);
	}

	#[test]
	fn guard_ignores_snapshot_timestamps() {
		let mut autosave = AutosaveCoordinator::new(AutosaveConfig::default());
		let mut first = text("a");
		first.time = Some(1);
		autosave.record(first);

		let mut second = text("a");
		second.time = Some(2);
		assert_eq!(autosave.decide(&second), AutosaveDecision::Skip(SkipReason::Unchanged));
	}

	#[test]
	fn restore_reopens_the_guard() {
		let mut autosave = AutosaveCoordinator::new(AutosaveConfig::default());
		let previous = autosave.record(text("a"));
		autosave.restore(previous);
		assert_eq!(autosave.decide(&text("a")), AutosaveDecision::Emit);
	}

	#[test]
	fn disabled_coordinator_never_emits() {
		let autosave = AutosaveCoordinator::new(AutosaveConfig {
			enabled: false,
			..AutosaveConfig::default()
		});
		assert_eq!(autosave.decide(&text("a")), AutosaveDecision::Skip(SkipReason::Disabled));
		assert!(!autosave.saves_on_change());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn change_burst_yields_one_evaluation() {
		let scheduler = Scheduler::default();
		let mut autosave = AutosaveCoordinator::new(AutosaveConfig::default());
		let (tx, mut rx) = mpsc::unbounded_channel();

		for _ in 0..20 {
			let tx = tx.clone();
			autosave.restart_debounce(&scheduler, move |id| {
				let _ = tx.send(id);
			});
			tokio::time::advance(Duration::from_secs(1)).await;
		}
		settle().await;
		assert!(rx.try_recv().is_err());

		tokio::time::advance(Duration::from_secs(5)).await;
		settle().await;

		let fired = rx.try_recv().unwrap();
		assert!(autosave.accept_debounce(fired));
		assert!(rx.try_recv().is_err());
	}

	#[tokio::test(flavor = "current_thread", start_paused = true)]
	async fn ticker_fires_each_period_until_disabled() {
		let scheduler = Scheduler::default();
		let mut autosave = AutosaveCoordinator::new(AutosaveConfig::default());
		let (tx, mut rx) = mpsc::unbounded_channel();

		let id = autosave.start_ticker(&scheduler, move |id| {
			let _ = tx.send(id);
		});
		settle().await;

		for _ in 0..3 {
			tokio::time::advance(Duration::from_secs(30)).await;
			settle().await;
			assert_eq!(rx.try_recv().unwrap(), id);
		}
		assert!(autosave.accept_tick(id));

		autosave.set_enabled(false);
		assert!(!autosave.is_ticking());
		assert!(!autosave.accept_tick(id));

		tokio::time::advance(Duration::from_secs(90)).await;
		settle().await;
		assert!(rx.try_recv().is_err());
	}
}
