//! Quire session harness.
//!
//! Hosts one bridge session around an in-memory widget. Host events and local
//! commands are read from stdin as JSON lines; client events are written to
//! stdout the same way. Logs go to stderr.

mod script;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use quire_bridge::{
	BridgeConfig, ClientEvent, ControlProbe, Controls, HostChannel, MemoryWidget, SessionBuilder, SessionHandle,
	WidgetEvent,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::script::{Command, Line};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Profile {
	/// Block editor: autosave on, saves on every change.
	Block,
	/// Rich-text editor: autosave off, live change sync.
	Rich,
}

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(about = "Run an editor bridge session over stdin and stdout")]
struct Args {
	/// Built-in configuration profile
	#[arg(short, long, value_enum, default_value = "block")]
	profile: Profile,

	/// TOML configuration file; replaces the profile
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// File holding the initially stored content
	#[arg(short, long, value_name = "PATH")]
	initial: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
	let subscriber = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.finish();
	tracing::subscriber::set_global_default(subscriber)?;

	let config = match &args.config {
		Some(path) => BridgeConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
		None => match args.profile {
			Profile::Block => BridgeConfig::block_editor(),
			Profile::Rich => BridgeConfig::rich_editor(),
		},
	};

	let widget = MemoryWidget::new();
	let probe = ControlProbe::new();
	let (host, events) = HostChannel::pair();
	let mut builder = SessionBuilder::new(widget.clone(), host)
		.config(config)
		.controls(
			Controls::new()
				.save_control(probe.clone())
				.autosave_indicator(probe.clone()),
		);
	if let Some(path) = &args.initial {
		builder = builder.initial_content(std::fs::read_to_string(path)?);
	}
	let (handle, session) = builder.spawn()?;
	let writer = tokio::spawn(write_events(events));

	info!(profile = ?args.profile, "session started");

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		let parsed = match script::parse(&line) {
			None => continue,
			Some(Ok(parsed)) => parsed,
			Some(Err(err)) => {
				warn!(error = %err, "unrecognized input line");
				continue;
			}
		};
		if !dispatch(&handle, &widget, parsed).await {
			break;
		}
	}

	// Fails only when the session already stopped on its own.
	let _ = handle.teardown();
	drop(handle);
	session.await?;
	writer.await??;

	let controls = probe.state();
	info!(save_enabled = controls.save_enabled, autosave = ?controls.autosave, "session finished");
	Ok(())
}

/// Applies one input line. Returns false when the harness should stop.
async fn dispatch(handle: &SessionHandle, widget: &MemoryWidget, line: Line) -> bool {
	let result = match line {
		Line::Host(event) => handle.host_event(event),
		Line::Command(Command::Ready) => handle.widget_event(WidgetEvent::Ready),
		Line::Command(Command::Change { blocks }) => {
			widget.set_blocks(blocks);
			handle.widget_event(WidgetEvent::Changed)
		}
		Line::Command(Command::Save) => handle.save().await,
		Line::Command(Command::ToggleAutosave) => handle.toggle_autosave().await.map(|status| {
			info!(%status, "autosave toggled");
		}),
		Line::Command(Command::UploadUrl { url }) => {
			// The reply arrives through a later stdin line, so wait off the read loop.
			let handle = handle.clone();
			tokio::spawn(async move {
				match handle.upload_by_url(url).await {
					Ok(file) => info!(url = %file.url, "upload stored"),
					Err(err) => warn!(error = %err, "upload failed"),
				}
			});
			Ok(())
		}
		Line::Command(Command::Quit) => return false,
	};
	if let Err(err) = result {
		warn!(error = %err, message = %err.user_message(), "command failed");
	}
	!handle.is_closed()
}

async fn write_events(mut events: mpsc::UnboundedReceiver<ClientEvent>) -> std::io::Result<()> {
	let mut stdout = tokio::io::stdout();
	while let Some(event) = events.recv().await {
		let mut line = serde_json::to_vec(&event)?;
		line.push(b'\n');
		stdout.write_all(&line).await?;
		stdout.flush().await?;
	}
	Ok(())
}
