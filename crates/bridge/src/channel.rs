//! Outbound half of the host event channel.

use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::protocol::ClientEvent;

/// Sends [`ClientEvent`]s to the host.
///
/// The receiving half belongs to whatever transport carries events to the
/// host (a socket writer, the stdio harness, a test).
#[derive(Debug, Clone)]
pub struct HostChannel {
	tx: mpsc::UnboundedSender<ClientEvent>,
}

impl HostChannel {
	/// Creates a channel and the receiver the transport drains.
	pub fn pair() -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
		let (tx, rx) = mpsc::unbounded_channel();
		(Self { tx }, rx)
	}

	/// Wraps an existing sender.
	pub fn new(tx: mpsc::UnboundedSender<ClientEvent>) -> Self {
		Self { tx }
	}

	/// Pushes one event.
	pub fn push(&self, event: ClientEvent) -> Result<()> {
		let name = event.name();
		if self.tx.send(event).is_err() {
			tracing::warn!(event = name, "host channel closed; event dropped");
			return Err(Error::ChannelClosed);
		}
		tracing::trace!(event = name, "bridge.push");
		Ok(())
	}

	/// Returns true once the transport dropped its receiver.
	pub fn is_closed(&self) -> bool {
		self.tx.is_closed()
	}
}
