//! Image uploads.
//!
//! Two paths produce the same [`UploadedFile`]:
//! * direct: the file is posted to the upload endpoint through a [`Transfer`]
//!   running on a background task, which reports back through a notifier
//! * by URL: the host fetches the image; the request and its eventual
//!   `upload-complete`/`upload-error` reply are matched by a correlation id
//!
//! Both validate locally first and never contact the host or endpoint with
//! input that fails validation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use quire_rpc::{CorrelationId, CorrelationIdGen, CorrelationTable, CounterIdGen, ExpiryNotifier};
use quire_worker::{Scheduler, TaskClass};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;

use crate::config::UploadPolicy;
use crate::error::{Error, Result};

/// A file selected for direct upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
	/// Original file name.
	pub name: String,
	/// Declared MIME type.
	pub content_type: String,
	/// File contents.
	pub bytes: Vec<u8>,
}

impl UploadFile {
	/// Creates a file payload.
	pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self {
			name: name.into(),
			content_type: content_type.into(),
			bytes,
		}
	}

	/// Size in bytes.
	pub fn size(&self) -> u64 {
		self.bytes.len() as u64
	}
}

/// A stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
	/// Public URL.
	pub url: String,
	/// Alternative text.
	#[serde(default)]
	pub alt: String,
	/// Caption.
	#[serde(default)]
	pub caption: String,
}

impl UploadedFile {
	/// Creates a result with empty alt text and caption.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			alt: String::new(),
			caption: String::new(),
		}
	}
}

/// Upload result in the shape the widget's image tool consumes:
/// `{success: 1, file: {url, alt, caption}}` or `{success: 0, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
	/// 1 on success, 0 on failure.
	pub success: u8,
	/// The stored image.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<UploadedFile>,
	/// Failure reason.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl UploadResponse {
	/// Converts an upload outcome.
	pub fn from_result(result: &Result<UploadedFile>) -> Self {
		match result {
			Ok(file) => Self {
				success: 1,
				file: Some(file.clone()),
				error: None,
			},
			Err(err) => Self {
				success: 0,
				file: None,
				error: Some(err.user_message()),
			},
		}
	}
}

/// Raw reply from the upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferReply {
	/// HTTP status.
	pub status: u16,
	/// Decoded JSON body.
	pub body: Value,
}

/// Posts a file to the upload endpoint.
///
/// Implementations send a multipart body carrying the file with the
/// `X-CSRF-Token` anti-forgery header, and return the endpoint's status and
/// JSON body. Transport failures map to [`Error::Transfer`] with no status.
#[async_trait]
pub trait Transfer: Send + Sync {
	/// Performs one upload.
	async fn send(&self, file: UploadFile) -> Result<TransferReply>;
}

/// Normalizes an endpoint reply into an [`UploadedFile`].
///
/// Accepts the canonical `{success, file: {...}}` shape, the failure shape
/// `{success: false, error}` and a bare `{url, alt?, caption?}` object.
/// Normalizing an already-canonical reply yields the same file.
pub fn normalize(reply: TransferReply) -> Result<UploadedFile> {
	if !(200..300).contains(&reply.status) {
		return Err(Error::Transfer {
			status: Some(reply.status),
			message: format!("Upload failed with status: {}", reply.status),
		});
	}
	normalize_body(&reply.body).map_err(|message| Error::Transfer {
		status: Some(reply.status),
		message,
	})
}

fn normalize_body(body: &Value) -> std::result::Result<UploadedFile, String> {
	let Some(success) = body.get("success") else {
		return parse_file(body);
	};
	let succeeded = match success {
		Value::Bool(flag) => *flag,
		Value::Number(n) => n.as_u64() == Some(1),
		_ => false,
	};
	if !succeeded {
		let error = body.get("error").and_then(Value::as_str).unwrap_or("Upload failed");
		return Err(error.to_string());
	}
	match body.get("file") {
		Some(file) => parse_file(file),
		None => Err("Upload response is missing the file".to_string()),
	}
}

fn parse_file(value: &Value) -> std::result::Result<UploadedFile, String> {
	let url = value.get("url").and_then(Value::as_str).filter(|url| !url.is_empty());
	let Some(url) = url else {
		return Err("Upload response is missing the file url".to_string());
	};
	let text = |key: &str| value.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
	Ok(UploadedFile {
		url: url.to_string(),
		alt: text("alt"),
		caption: text("caption"),
	})
}

/// Receives the outcome of a direct transfer, keyed by its ticket.
pub(crate) type TransferNotifier = Arc<dyn Fn(u64, Result<UploadedFile>) + Send + Sync>;

/// Reply slot for a caller awaiting an upload.
pub(crate) type UploadReply = oneshot::Sender<Result<UploadedFile>>;

struct DirectUpload {
	reply: UploadReply,
	task: JoinHandle<()>,
}

/// Validates uploads and tracks those in flight.
pub struct UploadCoordinator {
	policy: UploadPolicy,
	extensions: Regex,
	transfer: Option<Arc<dyn Transfer>>,
	table: CorrelationTable<CorrelationId, UploadedFile, Error>,
	ids: CorrelationIdGen,
	direct: HashMap<u64, DirectUpload>,
	tickets: CounterIdGen,
	on_transfer: TransferNotifier,
}

impl fmt::Debug for UploadCoordinator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UploadCoordinator")
			.field("by_url", &self.table.len())
			.field("direct", &self.direct.len())
			.finish()
	}
}

impl UploadCoordinator {
	pub(crate) fn new(
		policy: UploadPolicy,
		transfer: Option<Arc<dyn Transfer>>,
		scheduler: Scheduler,
		on_expire: ExpiryNotifier<CorrelationId>,
		on_transfer: TransferNotifier,
	) -> Result<Self> {
		let alternatives: Vec<String> = policy.image_extensions.iter().map(|ext| regex::escape(ext)).collect();
		let extensions = Regex::new(&format!(r"(?i)\.(?:{})$", alternatives.join("|")))
			.map_err(|err| Error::InvalidInput(format!("image extension list: {err}")))?;
		if transfer.is_none() {
			tracing::warn!("no upload transfer configured; direct uploads disabled");
		}
		Ok(Self {
			policy,
			extensions,
			transfer,
			table: CorrelationTable::new(scheduler, on_expire),
			ids: CorrelationIdGen::new("upload"),
			direct: HashMap::new(),
			tickets: CounterIdGen::new(),
			on_transfer,
		})
	}

	/// Checks a file against the size ceiling and allowed types.
	pub fn check_file(&self, file: &UploadFile) -> Result<()> {
		if file.size() > self.policy.max_bytes {
			return Err(Error::InvalidInput(format!(
				"File size exceeds {} limit",
				human_size(self.policy.max_bytes)
			)));
		}
		if !self.policy.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(&file.content_type)) {
			return Err(Error::InvalidInput("Invalid file type. Only images are allowed.".into()));
		}
		Ok(())
	}

	/// Checks that a URL parses and points at a trusted host or an image path.
	pub fn check_url(&self, raw: &str) -> Result<Url> {
		let url = Url::parse(raw.trim()).map_err(|_| Error::InvalidInput("Invalid URL format".into()))?;
		if self.is_trusted_host(&url) || self.extensions.is_match(url.path()) {
			Ok(url)
		} else {
			Err(Error::InvalidInput("Invalid image URL".into()))
		}
	}

	fn is_trusted_host(&self, url: &Url) -> bool {
		let Some(host) = url.host_str() else {
			return false;
		};
		let host = host.to_ascii_lowercase();
		self.policy.trusted_domains.iter().any(|domain| {
			let domain = domain.to_ascii_lowercase();
			host == domain || host.strip_suffix(&domain).is_some_and(|rest| rest.ends_with('.'))
		})
	}

	/// Validates `file` and starts its transfer. Returns the ticket reported
	/// back through the transfer notifier.
	pub(crate) fn start_direct(&mut self, file: UploadFile, reply: UploadReply) -> std::result::Result<u64, (UploadReply, Error)> {
		if let Err(err) = self.check_file(&file) {
			return Err((reply, err));
		}
		let Some(transfer) = self.transfer.clone() else {
			return Err((reply, Error::InvalidInput("Direct uploads are not available".into())));
		};

		let ticket = self.tickets.next();
		let notify = self.on_transfer.clone();
		let name = file.name.clone();
		let size = file.size();
		let task = quire_worker::spawn(TaskClass::Background, async move {
			let result = transfer.send(file).await.and_then(normalize);
			notify(ticket, result);
		});

		tracing::debug!(ticket, file = %name, size, "upload.direct.start");
		self.direct.insert(ticket, DirectUpload { reply, task });
		Ok(ticket)
	}

	/// Delivers a finished transfer to its caller. Returns false for tickets
	/// that were already cancelled.
	pub(crate) fn finish_direct(&mut self, ticket: u64, result: Result<UploadedFile>) -> bool {
		let Some(upload) = self.direct.remove(&ticket) else {
			tracing::debug!(ticket, "upload.direct.finish for cancelled ticket");
			return false;
		};
		match &result {
			Ok(file) => tracing::debug!(ticket, url = %file.url, "upload.direct.done"),
			Err(err) => tracing::warn!(ticket, error = %err, "direct upload failed"),
		}
		let _ = upload.reply.send(result);
		true
	}

	/// Registers a host-mediated upload and returns its correlation id.
	///
	/// The caller must push `upload-by-url` with the id; `reply` receives the
	/// outcome once the host answers, the deadline passes or the coordinator
	/// shuts down.
	pub(crate) fn request_by_url(&mut self, reply: UploadReply) -> std::result::Result<CorrelationId, (UploadReply, Error)> {
		let id = self.ids.next_id();
		let pending = match self.table.register(id.clone(), self.policy.url_timeout()) {
			Ok(pending) => pending,
			Err(err) => return Err((reply, err.into())),
		};
		quire_worker::spawn(TaskClass::Background, async move {
			let result = match pending.await {
				Ok(outcome) => outcome.map_err(Error::from),
				Err(_) => Err(Error::Cancelled("upload abandoned".into())),
			};
			let _ = reply.send(result);
		});
		Ok(id)
	}

	/// Resolves a host-mediated upload.
	pub(crate) fn complete(&mut self, id: &CorrelationId, file: UploadedFile) -> bool {
		self.table.resolve(id, file)
	}

	/// Fails a host-mediated upload.
	pub(crate) fn fail(&mut self, id: &CorrelationId, err: Error) -> bool {
		self.table.reject(id, err)
	}

	/// Times out a host-mediated upload whose deadline passed.
	pub(crate) fn expire(&mut self, id: &CorrelationId) -> bool {
		self.table.expire(id)
	}

	/// Cancels every upload in flight. Returns how many were cancelled.
	pub(crate) fn shutdown(&mut self, reason: &str) -> usize {
		let mut cancelled = self.table.cancel_all(reason);
		for (ticket, upload) in self.direct.drain() {
			upload.task.abort();
			let _ = upload.reply.send(Err(Error::Cancelled(reason.to_string())));
			tracing::debug!(ticket, reason, "upload.direct.cancel");
			cancelled += 1;
		}
		cancelled
	}

	/// Number of uploads awaiting completion.
	pub fn in_flight(&self) -> usize {
		self.table.len() + self.direct.len()
	}
}

fn human_size(bytes: u64) -> String {
	const MIB: u64 = 1024 * 1024;
	if bytes % MIB == 0 {
		format!("{}MB", bytes / MIB)
	} else {
		format!("{bytes} bytes")
	}
}

#[cfg(test)]
mod tests;
