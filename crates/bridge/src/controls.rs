//! UI controls injected into a session.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// The manual save button.
pub trait SaveControl: Send {
	/// Enables or disables the control.
	fn set_enabled(&mut self, enabled: bool);

	/// Shows or clears the in-progress state.
	fn set_loading(&mut self, loading: bool);
}

/// The autosave status display.
pub trait AutosaveIndicator: Send {
	/// Displays the current autosave status.
	fn show(&mut self, status: AutosaveStatus);
}

/// Whether autosave is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveStatus {
	/// Autosave is enabled.
	On,
	/// Autosave is disabled.
	Off,
}

impl From<bool> for AutosaveStatus {
	fn from(enabled: bool) -> Self {
		if enabled { Self::On } else { Self::Off }
	}
}

impl fmt::Display for AutosaveStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::On => "ON",
			Self::Off => "OFF",
		})
	}
}

/// Controls handed to a session at construction. Either may be absent.
#[derive(Default)]
pub struct Controls {
	pub(crate) save: Option<Box<dyn SaveControl>>,
	pub(crate) autosave: Option<Box<dyn AutosaveIndicator>>,
}

impl fmt::Debug for Controls {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Controls")
			.field("save", &self.save.is_some())
			.field("autosave", &self.autosave.is_some())
			.finish()
	}
}

impl Controls {
	/// Creates an empty control set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attach the save control.
	pub fn save_control(mut self, control: impl SaveControl + 'static) -> Self {
		self.save = Some(Box::new(control));
		self
	}

	/// Attach the autosave indicator.
	pub fn autosave_indicator(mut self, indicator: impl AutosaveIndicator + 'static) -> Self {
		self.autosave = Some(Box::new(indicator));
		self
	}

	pub(crate) fn set_save_enabled(&mut self, enabled: bool) {
		if let Some(save) = self.save.as_mut() {
			save.set_enabled(enabled);
		}
	}

	pub(crate) fn set_save_loading(&mut self, loading: bool) {
		if let Some(save) = self.save.as_mut() {
			save.set_loading(loading);
		}
	}

	pub(crate) fn show_autosave(&mut self, status: AutosaveStatus) {
		if let Some(indicator) = self.autosave.as_mut() {
			indicator.show(status);
		}
	}
}

/// Observed state of a [`ControlProbe`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeState {
	/// Whether the save control is enabled.
	pub save_enabled: bool,
	/// Whether the save control shows its loading state.
	pub save_loading: bool,
	/// Number of times the loading state was switched on.
	pub loading_shown: usize,
	/// Last autosave status displayed.
	pub autosave: Option<AutosaveStatus>,
}

/// Control implementation that records what it was told to display.
///
/// Clones share state. Used headless by the stdio harness and by tests.
#[derive(Debug, Clone, Default)]
pub struct ControlProbe {
	state: Arc<Mutex<ProbeState>>,
}

impl ControlProbe {
	/// Creates a probe with the save control disabled.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the recorded state.
	pub fn state(&self) -> ProbeState {
		self.state.lock().clone()
	}
}

impl SaveControl for ControlProbe {
	fn set_enabled(&mut self, enabled: bool) {
		let mut state = self.state.lock();
		if state.save_enabled != enabled {
			tracing::debug!(enabled, "control.save");
		}
		state.save_enabled = enabled;
	}

	fn set_loading(&mut self, loading: bool) {
		let mut state = self.state.lock();
		if loading {
			state.loading_shown += 1;
		}
		state.save_loading = loading;
	}
}

impl AutosaveIndicator for ControlProbe {
	fn show(&mut self, status: AutosaveStatus) {
		tracing::debug!(%status, "control.autosave");
		self.state.lock().autosave = Some(status);
	}
}
