use std::sync::Arc;
use std::time::Duration;

use quire_worker::Scheduler;
use tokio::sync::mpsc;

use super::*;
use crate::{CorrelationId, CorrelationIdGen};

type Table = CorrelationTable<CorrelationId, &'static str, String>;

fn table() -> (Table, mpsc::UnboundedReceiver<CorrelationId>) {
	let (tx, rx) = mpsc::unbounded_channel();
	let notifier: ExpiryNotifier<CorrelationId> = Arc::new(move |id| {
		let _ = tx.send(id);
	});
	(CorrelationTable::new(Scheduler::default(), notifier), rx)
}

async fn settle() {
	for _ in 0..4 {
		tokio::task::yield_now().await;
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolve_completes_exactly_once() {
	let (mut table, _expiries) = table();
	let id = CorrelationIdGen::new("t").next_id();

	let reply = table.register(id.clone(), Duration::from_secs(30)).unwrap();
	assert!(table.contains(&id));

	assert!(table.resolve(&id, "done"));
	assert!(!table.resolve(&id, "again"));
	assert!(!table.reject(&id, "late".into()));
	assert!(table.is_empty());

	assert_eq!(reply.await.unwrap(), Ok("done"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn reject_delivers_failure() {
	let (mut table, _expiries) = table();
	let id = CorrelationId::from_wire("a");

	let reply = table.register(id.clone(), Duration::from_secs(30)).unwrap();
	assert!(table.reject(&id, "host said no".into()));

	assert_eq!(reply.await.unwrap(), Err(Rejection::Failed("host said no".to_string())));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn duplicate_registration_fails_without_disturbing_original() {
	let (mut table, _expiries) = table();
	let id = CorrelationId::from_wire("dup");

	let reply = table.register(id.clone(), Duration::from_secs(30)).unwrap();
	let err = table.register(id.clone(), Duration::from_secs(30)).unwrap_err();
	assert_eq!(err, CorrelationError::DuplicateId("dup".into()));
	assert_eq!(table.len(), 1);

	table.resolve(&id, "ok");
	assert_eq!(reply.await.unwrap(), Ok("ok"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn deadline_notifies_owner_and_expire_times_out() {
	let (mut table, mut expiries) = table();
	let id = CorrelationId::from_wire("slow");

	let reply = table.register(id.clone(), Duration::from_secs(30)).unwrap();

	tokio::time::advance(Duration::from_secs(29)).await;
	settle().await;
	assert!(expiries.try_recv().is_err());

	tokio::time::advance(Duration::from_secs(1)).await;
	settle().await;
	let expired = expiries.try_recv().unwrap();
	assert_eq!(expired, id);

	assert!(table.expire(&expired));
	assert!(!table.contains(&id));
	assert_eq!(reply.await.unwrap(), Err(Rejection::TimedOut(Duration::from_secs(30))));

	// A reply arriving after the local timeout is ignored.
	assert!(!table.resolve(&id, "too late"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn expire_before_deadline_is_ignored() {
	let (mut table, _expiries) = table();
	let id = CorrelationId::from_wire("early");

	let _reply = table.register(id.clone(), Duration::from_secs(30)).unwrap();
	assert!(!table.expire(&id));
	assert!(table.contains(&id));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn resolved_entry_never_reports_expiry() {
	let (mut table, mut expiries) = table();
	let id = CorrelationId::from_wire("fast");

	let _reply = table.register(id.clone(), Duration::from_secs(1)).unwrap();
	table.resolve(&id, "ok");

	tokio::time::advance(Duration::from_secs(5)).await;
	settle().await;
	assert!(expiries.try_recv().is_err());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn cancel_all_rejects_everything() {
	let (mut table, mut expiries) = table();
	let mut ids = CorrelationIdGen::new("c");

	let replies: Vec<_> = (0..3)
		.map(|_| table.register(ids.next_id(), Duration::from_secs(1)).unwrap())
		.collect();

	assert_eq!(table.cancel_all("session destroyed"), 3);
	assert!(table.is_empty());
	assert_eq!(table.cancel_all("session destroyed"), 0);

	for reply in replies {
		assert_eq!(
			reply.await.unwrap(),
			Err(Rejection::Cancelled("session destroyed".into()))
		);
	}

	tokio::time::advance(Duration::from_secs(5)).await;
	settle().await;
	assert!(expiries.try_recv().is_err());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn replies_resolve_in_any_order() {
	let (mut table, _expiries) = table();
	let first = CorrelationId::from_wire("first");
	let second = CorrelationId::from_wire("second");

	let first_reply = table.register(first.clone(), Duration::from_secs(30)).unwrap();
	let second_reply = table.register(second.clone(), Duration::from_secs(30)).unwrap();

	table.resolve(&second, "b");
	table.resolve(&first, "a");

	assert_eq!(first_reply.await.unwrap(), Ok("a"));
	assert_eq!(second_reply.await.unwrap(), Ok("b"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn dropped_receiver_still_removes_entry() {
	let (mut table, _expiries) = table();
	let id = CorrelationId::from_wire("gone");

	drop(table.register(id.clone(), Duration::from_secs(30)).unwrap());
	assert!(table.resolve(&id, "ok"));
	assert!(table.is_empty());
}
