//! Session lifecycle for one mounted editing widget.
//!
//! # Purpose
//!
//! - Bridge a widget and its host over one asynchronous event channel: user edits, uploads correlated by id, and timer-driven autosave.
//! - Own every resource a mounted widget needs (timers, pending uploads, the pending save) and release all of it on teardown.
//! - Exclude the transport that carries [`ClientEvent`]s and [`HostEvent`]s; see [`HostChannel`] and the stdio harness in `quire-cli`.
//!
//! # Mental model
//!
//! - A [`Session`] is a synchronous state machine. Every stimulus is a [`SessionInput`] handled to completion by [`Session::handle`].
//! - Timers and transfers run as tokio tasks. They never touch the session; they post an input carrying their task id or ticket back into the inbox.
//! - The inbox is read by exactly one task ([`Session::run`]), so inputs are processed one at a time in arrival order.
//! - The host replies with named events only. Upload replies carry the correlation id the session generated, which is the only link back to the waiting caller.
//! - Autosave is drop-and-rearm: a timer firing while a save is in flight is discarded, and the next change or tick evaluates again.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints | Constructed / mutated in |
//! |---|---|---|---|
//! | [`Session`] | Per-widget state machine | MUST be driven from a single task | [`SessionBuilder::build`], [`Session::handle`] |
//! | [`SessionState`] | Lifecycle position | `Destroyed` is terminal | `Session::transition`, [`Session::teardown`] |
//! | [`SessionInput`] | Inbox message | Timer inputs carry the firing task's id | timers, [`SessionHandle`] |
//! | [`WidgetEvent`] | Widget lifecycle and change notification | `Ready` only leaves `Initializing` once | widget integration |
//! | [`SessionHandle`] | Cloneable sender into the inbox | Async calls fail with [`Error::ChannelClosed`] after the loop exits | [`SessionBuilder::spawn`] |
//!
//! # Invariants
//!
//! 1. At most one save is in flight; a manual save requested while `Saving` is rejected, never queued.
//!    - Enforced in: `Session::save`
//!    - Tested by: `session::tests::second_manual_save_while_saving_is_rejected`
//!    - Failure symptom: the host receives overlapping saves and acknowledges them out of order.
//!
//! 2. Empty content never leaves the client as a save; a manual save of empty content sends `empty-content-warning` instead.
//!    - Enforced in: `Session::prepare_manual_save`, [`AutosaveCoordinator::decide`]
//!    - Tested by: `session::tests::empty_document_save_warns_and_disables_control`
//!    - Failure symptom: the host persists a blank document over real content.
//!
//! 3. Stale timer fires are discarded by task id.
//!    - Enforced in: `Session::on_debounce`, `Session::on_tick`, `Session::on_save_deadline`
//!    - Tested by: `session::tests::change_burst_autosaves_once`
//!    - Failure symptom: a replaced debounce still fires and emits a duplicate autosave.
//!
//! 4. Teardown is idempotent and ordered: mark destroyed, cancel timers, cancel uploads, release the widget.
//!    - Enforced in: [`Session::teardown`]
//!    - Tested by: `session::tests::teardown_releases_everything`
//!    - Failure symptom: timers fire into a released widget or upload callers wait forever.
//!
//! 5. No input mutates a destroyed session; inputs with a reply slot are answered with [`Error::Cancelled`].
//!    - Enforced in: `Session::reject_late`
//!    - Tested by: `session::tests::late_inputs_after_teardown_are_ignored`
//!    - Failure symptom: a late host reply resurrects state after unmount.

mod runtime;

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use quire_document::{Document, StoredContent, is_empty, parse_stored, serialize, validate};
use quire_rpc::{CorrelationId, ExpiryNotifier};
use quire_worker::{ScheduledTask, Scheduler, TaskClass, TaskId};
use tokio::sync::{mpsc, oneshot};

pub use self::runtime::SessionHandle;
use crate::autosave::{AutosaveCoordinator, AutosaveDecision};
use crate::channel::HostChannel;
use crate::config::BridgeConfig;
use crate::controls::{AutosaveStatus, Controls};
use crate::error::{Error, Result, SaveRejection};
use crate::protocol::{ClientEvent, HostEvent};
use crate::upload::{Transfer, TransferNotifier, UploadCoordinator, UploadFile, UploadedFile};
use crate::widget::Widget;

/// Lifecycle position of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	/// Widget construction in progress; no saves accepted.
	Initializing,
	/// No unsaved changes.
	Ready,
	/// Changed since the last successful save.
	Dirty,
	/// A save awaits acknowledgement.
	Saving,
	/// Torn down.
	Destroyed,
}

/// Notifications from the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
	/// The widget finished initializing.
	Ready,
	/// The widget could not initialize.
	InitFailed(String),
	/// The user changed the content.
	Changed,
}

/// Messages processed by a session, one at a time.
#[derive(Debug)]
pub enum SessionInput {
	/// Widget notification.
	Widget(WidgetEvent),
	/// Host event.
	Host(HostEvent),
	/// Manual save request.
	Save {
		/// Receives whether `save-content` was emitted.
		reply: oneshot::Sender<Result<()>>,
	},
	/// Flip autosave on or off.
	ToggleAutosave {
		/// Receives the new status.
		reply: oneshot::Sender<Result<AutosaveStatus>>,
	},
	/// Direct upload request.
	UploadFile {
		/// The file to upload.
		file: UploadFile,
		/// Receives the stored image.
		reply: oneshot::Sender<Result<UploadedFile>>,
	},
	/// Host-mediated upload request.
	UploadUrl {
		/// Remote image location.
		url: String,
		/// Receives the stored image.
		reply: oneshot::Sender<Result<UploadedFile>>,
	},
	/// A direct transfer finished.
	TransferFinished {
		/// Ticket returned when the transfer started.
		ticket: u64,
		/// Normalized outcome.
		result: Result<UploadedFile>,
	},
	/// The change debounce elapsed.
	DebounceElapsed(TaskId),
	/// The periodic autosave tick fired.
	AutosaveTick(TaskId),
	/// A host-mediated upload reached its deadline.
	UploadExpired(CorrelationId),
	/// The pending save reached its deadline.
	SaveDeadline(TaskId),
	/// Unmount.
	Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaveOrigin {
	Manual,
	Auto,
}

struct PendingSave {
	origin: SaveOrigin,
	/// Snapshot to restore if the host refuses the save.
	previous: Option<Document>,
	deadline: ScheduledTask,
}

type Inbox = mpsc::WeakUnboundedSender<SessionInput>;

fn post(inbox: &Inbox, input: SessionInput) {
	if let Some(tx) = inbox.upgrade() {
		let _ = tx.send(input);
	}
}

/// Collects what a session needs before it starts.
pub struct SessionBuilder<W> {
	widget: W,
	host: HostChannel,
	config: BridgeConfig,
	controls: Controls,
	transfer: Option<Arc<dyn Transfer>>,
	initial_content: Option<String>,
}

impl<W: Widget> SessionBuilder<W> {
	/// Starts a builder for `widget` talking to `host`, with block editor
	/// defaults and no controls.
	pub fn new(widget: W, host: HostChannel) -> Self {
		Self {
			widget,
			host,
			config: BridgeConfig::default(),
			controls: Controls::default(),
			transfer: None,
			initial_content: None,
		}
	}

	/// Set the configuration.
	pub fn config(mut self, config: BridgeConfig) -> Self {
		self.config = config;
		self
	}

	/// Set the UI controls.
	pub fn controls(mut self, controls: Controls) -> Self {
		self.controls = controls;
		self
	}

	/// Set the direct upload transfer.
	pub fn transfer(mut self, transfer: Arc<dyn Transfer>) -> Self {
		self.transfer = Some(transfer);
		self
	}

	/// Set the stored content loaded into the widget on mount.
	pub fn initial_content(mut self, content: impl Into<String>) -> Self {
		self.initial_content = Some(content.into());
		self
	}

	/// Builds the session. Timers and transfers post into `inbox`, which the
	/// session only holds weakly.
	pub fn build(self, inbox: &mpsc::UnboundedSender<SessionInput>) -> Result<Session<W>> {
		let Self {
			mut widget,
			host,
			config,
			mut controls,
			transfer,
			initial_content,
		} = self;
		let inbox = inbox.downgrade();
		let scheduler = Scheduler::new(TaskClass::Interactive);

		let on_expire: ExpiryNotifier<CorrelationId> = {
			let inbox = inbox.clone();
			Arc::new(move |id| post(&inbox, SessionInput::UploadExpired(id)))
		};
		let on_transfer: TransferNotifier = {
			let inbox = inbox.clone();
			Arc::new(move |ticket, result| post(&inbox, SessionInput::TransferFinished { ticket, result }))
		};
		let uploads = UploadCoordinator::new(config.upload.clone(), transfer, scheduler.clone(), on_expire, on_transfer)?;
		let mut autosave = AutosaveCoordinator::new(config.autosave.clone());

		let manual_save = controls.save.is_some();
		if !manual_save {
			let err = Error::InvalidInput("save control not found".into());
			tracing::warn!(error = %err, "manual save disabled");
		}
		let toggle_available = !autosave.is_toggleable() || controls.autosave.is_some();
		if !toggle_available {
			let err = Error::InvalidInput("autosave indicator not found".into());
			tracing::warn!(error = %err, "autosave toggle disabled");
		}

		let stored = parse_stored(initial_content.as_deref().unwrap_or_default());
		match &stored {
			StoredContent::Document(document) => {
				autosave.record(document.clone());
			}
			StoredContent::Markup(_) => tracing::warn!("initial content is not a document; loading as markup"),
			StoredContent::Empty => {}
		}
		if let Err(err) = widget.load(stored) {
			tracing::warn!(error = %err, "failed to load initial content");
		}

		controls.set_save_enabled(false);
		controls.show_autosave(AutosaveStatus::from(autosave.is_enabled()));

		tracing::info!(
			autosave = autosave.is_enabled(),
			live_sync = config.live_sync,
			"session created"
		);
		Ok(Session {
			state: SessionState::Initializing,
			widget: Some(widget),
			host,
			inbox,
			scheduler,
			config,
			controls,
			autosave,
			uploads,
			pending_save: None,
			edited_while_saving: false,
			init_failed: false,
			manual_save,
			toggle_available,
		})
	}
}

/// One mounted widget bridged to the host.
pub struct Session<W> {
	state: SessionState,
	widget: Option<W>,
	host: HostChannel,
	inbox: Inbox,
	scheduler: Scheduler,
	config: BridgeConfig,
	controls: Controls,
	autosave: AutosaveCoordinator,
	uploads: UploadCoordinator,
	pending_save: Option<PendingSave>,
	edited_while_saving: bool,
	init_failed: bool,
	manual_save: bool,
	toggle_available: bool,
}

impl<W> fmt::Debug for Session<W> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("state", &self.state)
			.field("autosave", &self.autosave.is_enabled())
			.field("uploads", &self.uploads)
			.field("saving", &self.pending_save.as_ref().map(|p| p.origin))
			.finish_non_exhaustive()
	}
}

impl<W: Widget> Session<W> {
	/// Current lifecycle position.
	pub fn state(&self) -> SessionState {
		self.state
	}

	/// Returns true once torn down.
	pub fn is_destroyed(&self) -> bool {
		self.state == SessionState::Destroyed
	}

	/// Whether autosave currently runs.
	pub fn autosave_enabled(&self) -> bool {
		self.autosave.is_enabled()
	}

	/// Number of uploads awaiting completion.
	pub fn uploads_in_flight(&self) -> usize {
		self.uploads.in_flight()
	}

	/// Processes one input to completion.
	pub fn handle(&mut self, input: SessionInput) {
		if self.is_destroyed() {
			self.reject_late(input);
			return;
		}
		match input {
			SessionInput::Widget(event) => self.on_widget(event),
			SessionInput::Host(event) => self.on_host(event),
			SessionInput::Save { reply } => {
				let _ = reply.send(self.save());
			}
			SessionInput::ToggleAutosave { reply } => {
				let _ = reply.send(self.toggle_autosave());
			}
			SessionInput::UploadFile { file, reply } => self.upload_file(file, reply),
			SessionInput::UploadUrl { url, reply } => self.upload_url(&url, reply),
			SessionInput::TransferFinished { ticket, result } => self.on_transfer_finished(ticket, result),
			SessionInput::DebounceElapsed(id) => self.on_debounce(id),
			SessionInput::AutosaveTick(id) => self.on_tick(id),
			SessionInput::UploadExpired(id) => self.on_upload_expired(&id),
			SessionInput::SaveDeadline(id) => self.on_save_deadline(id),
			SessionInput::Teardown => self.teardown(),
		}
	}

	/// Releases every resource the session owns. Idempotent.
	pub fn teardown(&mut self) {
		if self.is_destroyed() {
			return;
		}
		let from = self.state;
		self.state = SessionState::Destroyed;

		self.autosave.stop();
		self.pending_save = None;
		let cancelled = self.uploads.shutdown("session destroyed");
		if let Some(mut widget) = self.widget.take() {
			widget.destroy();
		}
		self.controls.set_save_enabled(false);

		tracing::info!(from = ?from, cancelled_uploads = cancelled, "session destroyed");
	}

	fn reject_late(&mut self, input: SessionInput) {
		let cancelled = || Error::Cancelled("session destroyed".into());
		match input {
			SessionInput::Save { reply } => {
				let _ = reply.send(Err(cancelled()));
			}
			SessionInput::ToggleAutosave { reply } => {
				let _ = reply.send(Err(cancelled()));
			}
			SessionInput::UploadFile { reply, .. } | SessionInput::UploadUrl { reply, .. } => {
				let _ = reply.send(Err(cancelled()));
			}
			SessionInput::Teardown => {}
			other => tracing::debug!(input = ?other, "input ignored after teardown"),
		}
	}

	fn transition(&mut self, next: SessionState) {
		if self.state != next {
			tracing::info!(from = ?self.state, to = ?next, "session.transition");
			self.state = next;
		}
		self.sync_controls();
	}

	fn sync_controls(&mut self) {
		let enabled = self.manual_save && self.state == SessionState::Dirty;
		self.controls.set_save_enabled(enabled);
	}

	fn push(&self, event: ClientEvent) -> Result<()> {
		self.host.push(event)
	}

	fn flash_error(&self, message: impl Into<String>) {
		let _ = self.push(ClientEvent::error(message));
	}

	fn snapshot(&mut self) -> Result<Document> {
		match self.widget.as_mut() {
			Some(widget) => widget.snapshot(),
			None => Err(Error::Widget("widget released".into())),
		}
	}

	fn on_widget(&mut self, event: WidgetEvent) {
		match event {
			WidgetEvent::Ready => {
				if self.state != SessionState::Initializing || self.init_failed {
					tracing::debug!(state = ?self.state, "widget ready ignored");
					return;
				}
				self.transition(SessionState::Ready);
				if self.autosave.is_enabled() {
					self.start_ticker();
				}
			}
			WidgetEvent::InitFailed(reason) => {
				tracing::error!(%reason, "editor failed to initialize");
				self.init_failed = true;
				self.controls.set_save_enabled(false);
				self.flash_error("Editor failed to initialize");
			}
			WidgetEvent::Changed => self.on_change(),
		}
	}

	fn on_change(&mut self) {
		match self.state {
			SessionState::Initializing | SessionState::Destroyed => {
				tracing::debug!(state = ?self.state, "change ignored");
				return;
			}
			SessionState::Ready => self.transition(SessionState::Dirty),
			SessionState::Dirty => {}
			SessionState::Saving => {
				tracing::debug!("change during save; dirty once it resolves");
				self.edited_while_saving = true;
			}
		}

		if self.autosave.saves_on_change() || self.config.live_sync {
			let inbox = self.inbox.clone();
			self.autosave
				.restart_debounce(&self.scheduler, move |id| post(&inbox, SessionInput::DebounceElapsed(id)));
		}
	}

	fn start_ticker(&mut self) {
		let inbox = self.inbox.clone();
		self.autosave
			.start_ticker(&self.scheduler, move |id| post(&inbox, SessionInput::AutosaveTick(id)));
	}

	fn on_debounce(&mut self, id: TaskId) {
		if !self.autosave.accept_debounce(id) {
			tracing::debug!(task = %id, "stale debounce fire");
			return;
		}
		let autosave = self.autosave.saves_on_change();
		if !self.config.live_sync && !autosave {
			return;
		}
		let document = match self.snapshot() {
			Ok(document) => document,
			Err(err) => {
				tracing::warn!(error = %err, "snapshot failed after change");
				return;
			}
		};

		if self.config.live_sync && self.autosave.differs(&document) {
			match serialize(&document) {
				Ok(content) => {
					let _ = self.push(ClientEvent::ContentChanged { content });
				}
				Err(err) => tracing::warn!(error = %err, "failed to serialize changed content"),
			}
		}
		if autosave {
			self.autosave_document(document, "debounce");
		}
	}

	fn on_tick(&mut self, id: TaskId) {
		if !self.autosave.accept_tick(id) {
			tracing::debug!(task = %id, "stale autosave tick");
			return;
		}
		if self.state != SessionState::Dirty {
			tracing::trace!(state = ?self.state, "autosave tick skipped");
			return;
		}
		match self.snapshot() {
			Ok(document) => self.autosave_document(document, "tick"),
			Err(err) => tracing::warn!(error = %err, "autosave snapshot failed"),
		}
	}

	fn autosave_document(&mut self, document: Document, trigger: &'static str) {
		if self.state != SessionState::Dirty {
			tracing::debug!(state = ?self.state, trigger, "autosave dropped");
			return;
		}
		match self.autosave.decide(&document) {
			AutosaveDecision::Skip(reason) => {
				tracing::debug!(?reason, trigger, "autosave skipped");
			}
			AutosaveDecision::Emit => {
				let content = match serialize(&document) {
					Ok(content) => content,
					Err(err) => {
						tracing::warn!(error = %err, "failed to serialize autosave content");
						return;
					}
				};
				if self.push(ClientEvent::AutoSave { content }).is_err() {
					return;
				}
				tracing::debug!(trigger, "autosave emitted");
				let previous = self.autosave.record(document);
				self.begin_save(SaveOrigin::Auto, previous);
			}
		}
	}

	fn save(&mut self) -> Result<()> {
		if !self.manual_save {
			return Err(Error::SaveRejected(SaveRejection::Unavailable));
		}
		match self.state {
			SessionState::Initializing => return Err(Error::SaveRejected(SaveRejection::NotReady)),
			SessionState::Saving => return Err(Error::SaveRejected(SaveRejection::InFlight)),
			_ => {}
		}

		self.controls.set_save_loading(true);
		let result = self.prepare_manual_save();
		self.controls.set_save_loading(false);
		self.sync_controls();

		if let Err(err) = &result {
			match err {
				Error::Content(_) | Error::Widget(_) => {
					tracing::warn!(error = %err, "manual save failed");
					self.flash_error(err.user_message());
				}
				_ => tracing::debug!(error = %err, "manual save not sent"),
			}
		}
		result
	}

	fn prepare_manual_save(&mut self) -> Result<()> {
		let document = self.snapshot()?;
		if is_empty(&document) {
			let _ = self.push(ClientEvent::EmptyContentWarning {});
			if self.state == SessionState::Dirty {
				self.transition(SessionState::Ready);
			}
			return Err(Error::SaveRejected(SaveRejection::EmptyContent));
		}
		if self.state != SessionState::Dirty {
			return Err(Error::SaveRejected(SaveRejection::NothingToSave));
		}

		validate(&document)?;
		let content = serialize(&document)?;
		self.push(ClientEvent::SaveContent {
			content,
			timestamp: Utc::now(),
		})?;
		let previous = self.autosave.record(document);
		self.begin_save(SaveOrigin::Manual, previous);
		Ok(())
	}

	fn begin_save(&mut self, origin: SaveOrigin, previous: Option<Document>) {
		let inbox = self.inbox.clone();
		let deadline = self
			.scheduler
			.delay(self.config.save.timeout(), move |id| post(&inbox, SessionInput::SaveDeadline(id)));
		self.pending_save = Some(PendingSave {
			origin,
			previous,
			deadline,
		});
		self.edited_while_saving = false;
		self.transition(SessionState::Saving);
	}

	fn finish_save(&mut self) -> Option<PendingSave> {
		let pending = self.pending_save.take()?;
		let next = if self.edited_while_saving {
			SessionState::Dirty
		} else {
			SessionState::Ready
		};
		self.edited_while_saving = false;
		self.transition(next);
		Some(pending)
	}

	fn on_save_deadline(&mut self, id: TaskId) {
		match &self.pending_save {
			Some(pending) if pending.deadline.id() == id => {}
			_ => {
				tracing::debug!(task = %id, "stale save deadline");
				return;
			}
		}
		let Some(pending) = self.pending_save.take() else {
			return;
		};
		self.edited_while_saving = false;
		self.transition(SessionState::Dirty);
		match pending.origin {
			SaveOrigin::Manual => {
				tracing::warn!(timeout_ms = self.config.save.timeout_ms, "save was not acknowledged");
				self.autosave.restore(pending.previous);
				self.flash_error("Save timed out");
			}
			SaveOrigin::Auto => {
				tracing::warn!(timeout_ms = self.config.save.timeout_ms, "autosave was not acknowledged");
			}
		}
	}

	fn toggle_autosave(&mut self) -> Result<AutosaveStatus> {
		if !self.autosave.is_toggleable() {
			return Err(Error::InvalidInput("autosave cannot be toggled in this profile".into()));
		}
		if !self.toggle_available {
			return Err(Error::InvalidInput("autosave indicator not found".into()));
		}

		let enabled = !self.autosave.is_enabled();
		self.autosave.set_enabled(enabled);
		if enabled && self.state != SessionState::Initializing {
			self.start_ticker();
		}
		let status = AutosaveStatus::from(enabled);
		self.controls.show_autosave(status);
		tracing::info!(%status, "autosave toggled");
		Ok(status)
	}

	fn upload_file(&mut self, file: UploadFile, reply: oneshot::Sender<Result<UploadedFile>>) {
		if let Err((reply, err)) = self.uploads.start_direct(file, reply) {
			tracing::warn!(error = %err, "direct upload rejected");
			self.flash_error(err.user_message());
			let _ = reply.send(Err(err));
		}
	}

	fn on_transfer_finished(&mut self, ticket: u64, result: Result<UploadedFile>) {
		let failure = result.as_ref().err().map(Error::user_message);
		if self.uploads.finish_direct(ticket, result)
			&& let Some(message) = failure
		{
			self.flash_error(message);
		}
	}

	fn upload_url(&mut self, raw: &str, reply: oneshot::Sender<Result<UploadedFile>>) {
		let url = match self.uploads.check_url(raw) {
			Ok(url) => url,
			Err(err) => {
				tracing::warn!(url = raw, error = %err, "upload url rejected");
				self.flash_error(err.user_message());
				let _ = reply.send(Err(err));
				return;
			}
		};
		let id = match self.uploads.request_by_url(reply) {
			Ok(id) => id,
			Err((reply, err)) => {
				tracing::error!(error = %err, "failed to register upload");
				let _ = reply.send(Err(err));
				return;
			}
		};

		tracing::debug!(upload_id = %id, url = url.as_str(), "upload.by_url");
		let event = ClientEvent::UploadByUrl {
			upload_id: id.to_string(),
			url: url.into(),
		};
		if let Err(err) = self.push(event) {
			self.uploads.fail(&id, err);
		}
	}

	fn on_upload_expired(&mut self, id: &CorrelationId) {
		if self.uploads.expire(id) {
			self.flash_error("Upload timed out");
		}
	}

	fn on_host(&mut self, event: HostEvent) {
		tracing::debug!(event = event.name(), state = ?self.state, "host event");
		match event {
			HostEvent::UploadComplete {
				upload_id,
				success,
				url,
				alt,
				caption,
				message,
			} => {
				let id = CorrelationId::from_wire(upload_id);
				match url.filter(|url| success && !url.is_empty()) {
					Some(url) => {
						self.uploads.complete(
							&id,
							UploadedFile {
								url,
								alt: alt.unwrap_or_default(),
								caption: caption.unwrap_or_default(),
							},
						);
					}
					None => self.fail_upload(&id, message),
				}
			}
			HostEvent::UploadError { upload_id, message } => {
				self.fail_upload(&CorrelationId::from_wire(upload_id), message);
			}
			HostEvent::ContentValidated { valid, errors } => {
				if valid {
					tracing::info!("content validated");
				} else {
					tracing::warn!(?errors, "content validation failed");
					let message = if errors.is_empty() {
						"Content validation failed".to_string()
					} else {
						format!("Content validation failed: {}", errors.join(", "))
					};
					self.flash_error(message);
				}
			}
			HostEvent::ContentSaved { message } => {
				if self.finish_save().is_none() {
					tracing::warn!("content-saved with no save in flight; ignored");
					return;
				}
				let message = message.unwrap_or_else(|| "Content saved successfully!".to_string());
				let _ = self.push(ClientEvent::success(message));
			}
			HostEvent::SaveError { message } => {
				let Some(pending) = self.pending_save.take() else {
					tracing::warn!("save-error with no save in flight; ignored");
					return;
				};
				self.autosave.restore(pending.previous);
				self.edited_while_saving = false;
				self.transition(SessionState::Dirty);
				self.flash_error(message.unwrap_or_else(|| "Failed to save content".to_string()));
			}
		}
	}

	fn fail_upload(&mut self, id: &CorrelationId, message: Option<String>) {
		let err = Error::Transfer {
			status: None,
			message: message.unwrap_or_else(|| "Upload failed".to_string()),
		};
		let text = err.user_message();
		if self.uploads.fail(id, err) {
			self.flash_error(text);
		}
	}
}
