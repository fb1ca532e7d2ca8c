//! Bridge between a rich-text editing widget and its remote host.
//!
//! The host only exchanges named events with the client, so everything that
//! looks like a call (saving, uploading by URL) is layered on top of one
//! event channel. A [`Session`] owns one mounted widget and reconciles:
//!
//! * bursty user edits, debounced into autosaves ([`AutosaveCoordinator`])
//! * uploads, matched back to their caller by correlation id ([`UploadCoordinator`])
//! * manual saves, at most one in flight
//!
//! Sessions are built with [`SessionBuilder`], configured by [`BridgeConfig`]
//! and driven through a [`SessionHandle`] once spawned.

#![warn(missing_docs)]

mod autosave;
mod channel;
mod config;
mod controls;
mod error;
mod protocol;
mod session;
mod upload;
mod widget;

pub use autosave::{AutosaveCoordinator, AutosaveDecision, SkipReason};
pub use channel::HostChannel;
pub use config::{AutosaveConfig, BridgeConfig, SaveConfig, UploadPolicy};
pub use controls::{AutosaveIndicator, AutosaveStatus, ControlProbe, Controls, ProbeState, SaveControl};
pub use error::{Error, Result, SaveRejection};
pub use protocol::{ClientEvent, FlashKind, HostEvent};
pub use session::{Session, SessionBuilder, SessionHandle, SessionInput, SessionState, WidgetEvent};
pub use upload::{Transfer, TransferReply, UploadCoordinator, UploadFile, UploadResponse, UploadedFile, normalize};
pub use widget::{MemoryWidget, Widget};
