use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;

use super::*;

type Respond = Box<dyn Fn(&UploadFile) -> Result<TransferReply> + Send + Sync>;

struct FakeTransfer {
	calls: AtomicUsize,
	hang: bool,
	respond: Respond,
}

impl FakeTransfer {
	fn replying(status: u16, body: Value) -> Arc<Self> {
		Arc::new(Self {
			calls: AtomicUsize::new(0),
			hang: false,
			respond: Box::new(move |_| {
				Ok(TransferReply {
					status,
					body: body.clone(),
				})
			}),
		})
	}

	fn hanging() -> Arc<Self> {
		Arc::new(Self {
			calls: AtomicUsize::new(0),
			hang: true,
			respond: Box::new(|_| Err(Error::Transfer { status: None, message: "unreachable".into() })),
		})
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Transfer for FakeTransfer {
	async fn send(&self, file: UploadFile) -> Result<TransferReply> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.hang {
			std::future::pending::<()>().await;
		}
		(self.respond)(&file)
	}
}

struct Rig {
	uploads: UploadCoordinator,
	expired: mpsc::UnboundedReceiver<CorrelationId>,
	finished: mpsc::UnboundedReceiver<(u64, Result<UploadedFile>)>,
}

fn rig(transfer: Option<Arc<FakeTransfer>>) -> Rig {
	let (expired_tx, expired) = mpsc::unbounded_channel();
	let (finished_tx, finished) = mpsc::unbounded_channel();
	let uploads = UploadCoordinator::new(
		UploadPolicy::default(),
		transfer.map(|t| t as Arc<dyn Transfer>),
		Scheduler::default(),
		Arc::new(move |id| {
			let _ = expired_tx.send(id);
		}),
		Arc::new(move |ticket, result| {
			let _ = finished_tx.send((ticket, result));
		}),
	)
	.unwrap();
	Rig {
		uploads,
		expired,
		finished,
	}
}

async fn settle() {
	for _ in 0..4 {
		tokio::task::yield_now().await;
	}
}

fn png(size: usize) -> UploadFile {
	UploadFile::new("photo.png", "image/png", vec![0; size])
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn oversized_file_is_rejected_before_transfer() {
	let transfer = FakeTransfer::replying(200, json!({}));
	let mut rig = rig(Some(transfer.clone()));
	let (reply, _rx) = oneshot::channel();

	let Err((_, err)) = rig.uploads.start_direct(png(15 * 1024 * 1024), reply) else {
		panic!("expected rejection");
	};
	assert!(matches!(&err, Error::InvalidInput(message) if message == "File size exceeds 10MB limit"));

	settle().await;
	assert_eq!(transfer.calls(), 0);
	assert_eq!(rig.uploads.in_flight(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn non_image_type_is_rejected() {
	let rig = rig(None);
	let file = UploadFile::new("notes.pdf", "application/pdf", vec![1, 2, 3]);

	assert!(matches!(rig.uploads.check_file(&file), Err(Error::InvalidInput(_))));
	assert!(rig.uploads.check_file(&UploadFile::new("a.svg", "image/svg+xml", vec![])).is_ok());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn direct_upload_reports_through_notifier() {
	let transfer = FakeTransfer::replying(200, json!({ "success": 1, "file": { "url": "/uploads/a.png" } }));
	let mut rig = rig(Some(transfer.clone()));
	let (reply, rx) = oneshot::channel();

	let ticket = rig.uploads.start_direct(png(1024), reply).ok().unwrap();
	assert_eq!(rig.uploads.in_flight(), 1);
	settle().await;

	let (finished, result) = rig.finished.try_recv().unwrap();
	assert_eq!(finished, ticket);
	assert!(rig.uploads.finish_direct(finished, result));
	assert!(!rig.uploads.finish_direct(finished, Ok(UploadedFile::new("dup"))));

	assert_eq!(rx.await.unwrap().unwrap(), UploadedFile::new("/uploads/a.png"));
	assert_eq!(transfer.calls(), 1);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn direct_upload_failure_status() {
	let mut rig = rig(Some(FakeTransfer::replying(500, json!({}))));
	let (reply, rx) = oneshot::channel();

	rig.uploads.start_direct(png(10), reply).ok().unwrap();
	settle().await;
	let (ticket, result) = rig.finished.try_recv().unwrap();
	rig.uploads.finish_direct(ticket, result);

	assert!(matches!(rx.await.unwrap(), Err(Error::Transfer { status: Some(500), .. })));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn direct_upload_without_transfer_is_invalid_input() {
	let mut rig = rig(None);
	let (reply, _rx) = oneshot::channel();

	let Err((_, err)) = rig.uploads.start_direct(png(10), reply) else {
		panic!("expected rejection");
	};
	assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn url_validation() {
	let rig = rig(None);
	let accepts = |raw: &str| rig.uploads.check_url(raw).is_ok();

	assert!(accepts("https://imgur.com/gallery/abc"));
	assert!(accepts("https://i.imgur.com/abc"));
	assert!(accepts("https://images.unsplash.com/photo-1"));
	assert!(accepts("https://picsum.photos/200/300"));
	assert!(accepts("https://example.com/a/b/photo.JPG"));
	assert!(accepts("https://example.com/photo.webp?w=200&h=100"));

	assert!(!accepts("https://notimgur.com/abc"));
	assert!(!accepts("https://imgur.com.evil.net/abc"));
	assert!(!accepts("https://example.com/photo.png.html"));
	assert!(!accepts("https://example.com/page?file=photo.png"));
	assert!(matches!(
		rig.uploads.check_url("not a url"),
		Err(Error::InvalidInput(message)) if message == "Invalid URL format"
	));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn url_upload_resolves_by_id() {
	let mut rig = rig(None);
	let (first_reply, first_rx) = oneshot::channel();
	let (second_reply, second_rx) = oneshot::channel();

	let first = rig.uploads.request_by_url(first_reply).ok().unwrap();
	let second = rig.uploads.request_by_url(second_reply).ok().unwrap();
	assert_ne!(first, second);
	assert_eq!(rig.uploads.in_flight(), 2);

	assert!(rig.uploads.fail(&second, Error::Transfer { status: None, message: "fetch failed".into() }));
	assert!(rig.uploads.complete(&first, UploadedFile::new("https://i.imgur.com/x.png")));
	assert!(!rig.uploads.complete(&first, UploadedFile::new("late")));

	assert_eq!(first_rx.await.unwrap().unwrap(), UploadedFile::new("https://i.imgur.com/x.png"));
	assert!(matches!(second_rx.await.unwrap(), Err(Error::Transfer { message, .. }) if message == "fetch failed"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn url_upload_times_out() {
	let mut rig = rig(None);
	let (reply, rx) = oneshot::channel();
	let id = rig.uploads.request_by_url(reply).ok().unwrap();

	tokio::time::advance(Duration::from_secs(30)).await;
	settle().await;

	assert_eq!(rig.expired.try_recv().unwrap(), id);
	assert!(rig.uploads.expire(&id));
	assert!(matches!(rx.await.unwrap(), Err(Error::Timeout(after)) if after == Duration::from_secs(30)));
	assert!(!rig.uploads.complete(&id, UploadedFile::new("too late")));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn shutdown_cancels_both_paths() {
	let transfer = FakeTransfer::hanging();
	let mut rig = rig(Some(transfer.clone()));
	let (direct_reply, direct_rx) = oneshot::channel();
	let (url_reply, url_rx) = oneshot::channel();

	rig.uploads.start_direct(png(10), direct_reply).ok().unwrap();
	rig.uploads.request_by_url(url_reply).ok().unwrap();
	settle().await;
	assert_eq!(transfer.calls(), 1);

	assert_eq!(rig.uploads.shutdown("session destroyed"), 2);
	assert_eq!(rig.uploads.in_flight(), 0);

	assert!(matches!(direct_rx.await.unwrap(), Err(Error::Cancelled(_))));
	assert!(matches!(url_rx.await.unwrap(), Err(Error::Cancelled(_))));

	tokio::time::advance(Duration::from_secs(60)).await;
	settle().await;
	assert!(rig.expired.try_recv().is_err());
	assert!(rig.finished.try_recv().is_err());
}

#[test]
fn canonical_reply_passes_through_unchanged() {
	let file = UploadedFile {
		url: "/uploads/a.png".into(),
		alt: "a".into(),
		caption: "c".into(),
	};
	let canonical = serde_json::to_value(UploadResponse::from_result(&Ok(file.clone()))).unwrap();
	assert_eq!(canonical, json!({ "success": 1, "file": { "url": "/uploads/a.png", "alt": "a", "caption": "c" } }));

	let normalized = normalize(TransferReply {
		status: 200,
		body: canonical.clone(),
	})
	.unwrap();
	assert_eq!(normalized, file);
	assert_eq!(serde_json::to_value(UploadResponse::from_result(&Ok(normalized))).unwrap(), canonical);
}

#[test]
fn bare_reply_is_filled_in() {
	let file = normalize(TransferReply {
		status: 201,
		body: json!({ "url": "/u/b.png" }),
	})
	.unwrap();
	assert_eq!(file, UploadedFile::new("/u/b.png"));
}

#[test]
fn failure_bodies_become_transfer_errors() {
	for body in [
		json!({ "success": false, "error": "Disk full" }),
		json!({ "success": 0, "error": "Disk full" }),
	] {
		let err = normalize(TransferReply { status: 200, body }).unwrap_err();
		assert!(matches!(&err, Error::Transfer { status: Some(200), message } if message == "Disk full"));
		assert_eq!(UploadResponse::from_result(&Err(err)), UploadResponse {
			success: 0,
			file: None,
			error: Some("Disk full".into()),
		});
	}

	let missing = normalize(TransferReply {
		status: 200,
		body: json!({ "success": true, "file": {} }),
	});
	assert!(matches!(missing, Err(Error::Transfer { .. })));
}
