//! Inbox loop and the handle used to drive a spawned session.

use quire_worker::TaskClass;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::{Session, SessionBuilder, SessionInput, WidgetEvent};
use crate::controls::AutosaveStatus;
use crate::error::{Error, Result};
use crate::protocol::HostEvent;
use crate::upload::{UploadFile, UploadedFile};
use crate::widget::Widget;

impl<W: Widget + 'static> SessionBuilder<W> {
	/// Builds the session and runs it on its own task.
	///
	/// The task exits after teardown, or after every [`SessionHandle`] is
	/// dropped, in which case it tears the session down itself.
	pub fn spawn(self) -> Result<(SessionHandle, JoinHandle<()>)> {
		let (tx, rx) = mpsc::unbounded_channel();
		let session = self.build(&tx)?;
		let task = quire_worker::spawn(TaskClass::Interactive, session.run(rx));
		Ok((SessionHandle { inbox: tx }, task))
	}
}

impl<W: Widget> Session<W> {
	/// Processes inputs until teardown or until every sender is gone.
	///
	/// Inputs still queued at exit are answered as if they arrived after
	/// teardown.
	pub async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<SessionInput>) {
		while let Some(input) = inbox.recv().await {
			self.handle(input);
			if self.is_destroyed() {
				break;
			}
		}
		self.teardown();

		inbox.close();
		while let Ok(input) = inbox.try_recv() {
			self.handle(input);
		}
		tracing::debug!("session loop exited");
	}
}

/// Cloneable entry point into a running session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
	inbox: mpsc::UnboundedSender<SessionInput>,
}

impl SessionHandle {
	/// Wraps the sending half of a session inbox.
	pub fn new(inbox: mpsc::UnboundedSender<SessionInput>) -> Self {
		Self { inbox }
	}

	fn send(&self, input: SessionInput) -> Result<()> {
		self.inbox.send(input).map_err(|_| Error::ChannelClosed)
	}

	async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<Result<T>>) -> SessionInput) -> Result<T> {
		let (reply, rx) = oneshot::channel();
		self.send(make(reply))?;
		rx.await.map_err(|_| Error::ChannelClosed)?
	}

	/// Forwards a widget notification.
	pub fn widget_event(&self, event: WidgetEvent) -> Result<()> {
		self.send(SessionInput::Widget(event))
	}

	/// Forwards a host event.
	pub fn host_event(&self, event: HostEvent) -> Result<()> {
		self.send(SessionInput::Host(event))
	}

	/// Requests a manual save. Resolves once `save-content` was emitted or
	/// the save was refused locally; the host's acknowledgement arrives
	/// separately as `content-saved` or `save-error`.
	pub async fn save(&self) -> Result<()> {
		self.call(|reply| SessionInput::Save { reply }).await
	}

	/// Flips autosave and returns the new status.
	pub async fn toggle_autosave(&self) -> Result<AutosaveStatus> {
		self.call(|reply| SessionInput::ToggleAutosave { reply }).await
	}

	/// Uploads a local file directly.
	pub async fn upload_file(&self, file: UploadFile) -> Result<UploadedFile> {
		self.call(|reply| SessionInput::UploadFile { file, reply }).await
	}

	/// Asks the host to fetch and store the image at `url`.
	pub async fn upload_by_url(&self, url: impl Into<String>) -> Result<UploadedFile> {
		let url = url.into();
		self.call(|reply| SessionInput::UploadUrl { url, reply }).await
	}

	/// Tears the session down.
	pub fn teardown(&self) -> Result<()> {
		self.send(SessionInput::Teardown)
	}

	/// Returns true once the session loop has exited.
	pub fn is_closed(&self) -> bool {
		self.inbox.is_closed()
	}
}
