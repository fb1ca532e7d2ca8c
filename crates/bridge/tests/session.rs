//! Drives a spawned session through its handle, the way an embedding page would.

use std::time::Duration;

use pretty_assertions::assert_eq;
use quire_bridge::{
	BridgeConfig, ClientEvent, ControlProbe, Controls, Error, HostChannel, HostEvent, MemoryWidget, SaveRejection,
	SessionBuilder, SessionHandle, WidgetEvent,
};
use quire_document::Block;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Mounted {
	handle: SessionHandle,
	task: JoinHandle<()>,
	widget: MemoryWidget,
	probe: ControlProbe,
	events: mpsc::UnboundedReceiver<ClientEvent>,
}

fn mount(config: BridgeConfig) -> Mounted {
	let widget = MemoryWidget::new();
	let probe = ControlProbe::new();
	let (host, events) = HostChannel::pair();
	let controls = Controls::new()
		.save_control(probe.clone())
		.autosave_indicator(probe.clone());

	let (handle, task) = SessionBuilder::new(widget.clone(), host)
		.config(config)
		.controls(controls)
		.spawn()
		.unwrap();
	handle.widget_event(WidgetEvent::Ready).unwrap();

	Mounted {
		handle,
		task,
		widget,
		probe,
		events,
	}
}

impl Mounted {
	fn edit(&self, text: &str) {
		self.widget
			.set_blocks(vec![Block::new("paragraph", json!({ "text": text }))]);
		self.handle.widget_event(WidgetEvent::Changed).unwrap();
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn save_round_trip_through_handle() {
	let mut m = mount(BridgeConfig::block_editor());
	m.edit("hello");

	m.handle.save().await.unwrap();
	let event = m.events.recv().await.unwrap();
	assert_eq!(event.name(), "save-content");
	assert!(matches!(
		m.handle.save().await,
		Err(Error::SaveRejected(SaveRejection::InFlight))
	));

	m.handle
		.host_event(HostEvent::ContentSaved { message: None })
		.unwrap();
	assert_eq!(
		m.events.recv().await.unwrap(),
		ClientEvent::success("Content saved successfully!")
	);
	assert!(!m.probe.state().save_enabled);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn url_upload_waits_for_host_reply() {
	let mut m = mount(BridgeConfig::block_editor());

	let caller = m.handle.clone();
	let upload = tokio::spawn(async move { caller.upload_by_url("https://imgur.com/cat.png").await });

	let ClientEvent::UploadByUrl { upload_id, url } = m.events.recv().await.unwrap() else {
		panic!("expected upload-by-url");
	};
	assert_eq!(url, "https://imgur.com/cat.png");

	m.handle
		.host_event(HostEvent::UploadComplete {
			upload_id,
			success: true,
			url: Some("https://cdn.example.com/cat.png".into()),
			alt: Some("cat".into()),
			caption: None,
			message: None,
		})
		.unwrap();

	let stored = upload.await.unwrap().unwrap();
	assert_eq!(stored.url, "https://cdn.example.com/cat.png");
	assert_eq!(stored.alt, "cat");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn url_upload_times_out_without_reply() {
	let mut m = mount(BridgeConfig::block_editor());

	let caller = m.handle.clone();
	let upload = tokio::spawn(async move { caller.upload_by_url("https://imgur.com/cat.png").await });
	assert_eq!(m.events.recv().await.unwrap().name(), "upload-by-url");

	tokio::time::sleep(Duration::from_secs(31)).await;
	assert!(matches!(upload.await.unwrap(), Err(Error::Timeout(_))));
	assert_eq!(m.events.recv().await.unwrap(), ClientEvent::error("Upload timed out"));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn teardown_stops_the_loop() {
	let m = mount(BridgeConfig::block_editor());
	m.edit("unsaved");

	let caller = m.handle.clone();
	let upload = tokio::spawn(async move { caller.upload_by_url("https://imgur.com/cat.png").await });
	tokio::task::yield_now().await;

	m.handle.teardown().unwrap();
	m.task.await.unwrap();

	assert!(m.widget.is_destroyed());
	assert!(m.handle.is_closed());
	assert!(!m.probe.state().save_enabled);
	assert!(matches!(
		upload.await.unwrap(),
		Err(Error::Cancelled(_) | Error::ChannelClosed)
	));
	assert!(matches!(m.handle.save().await, Err(Error::ChannelClosed)));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn dropping_every_handle_tears_down() {
	let Mounted {
		handle, task, widget, ..
	} = mount(BridgeConfig::rich_editor());
	assert_eq!(handle.toggle_autosave().await.unwrap().to_string(), "ON");

	drop(handle);
	task.await.unwrap();
	assert!(widget.is_destroyed());
}
