//! Session configuration.
//!
//! Durations are stored as milliseconds so TOML files stay flat:
//!
//! ```toml
//! live_sync = true
//!
//! [autosave]
//! enabled = false
//! toggleable = true
//! interval_ms = 10000
//!
//! [upload]
//! max_bytes = 10485760
//! url_timeout_ms = 30000
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level configuration for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
	/// Autosave scheduling.
	pub autosave: AutosaveConfig,
	/// Upload validation and deadlines.
	pub upload: UploadPolicy,
	/// Manual save behaviour.
	pub save: SaveConfig,
	/// Emit `content-changed` after each debounced edit.
	pub live_sync: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self::block_editor()
	}
}

impl BridgeConfig {
	/// Block editor profile: autosave always on, saved on a 5 s quiet period
	/// and every 30 s.
	pub fn block_editor() -> Self {
		Self {
			autosave: AutosaveConfig::default(),
			upload: UploadPolicy::default(),
			save: SaveConfig::default(),
			live_sync: false,
		}
	}

	/// Rich-delta editor profile: user-toggled autosave (initially off) on a
	/// 10 s tick, with edits streamed to the host as `content-changed`.
	pub fn rich_editor() -> Self {
		Self {
			autosave: AutosaveConfig {
				enabled: false,
				toggleable: true,
				save_on_change: false,
				interval_ms: 10_000,
				..AutosaveConfig::default()
			},
			live_sync: true,
			..Self::block_editor()
		}
	}

	/// Parses a configuration from TOML. Missing keys take block editor
	/// defaults.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	/// Replace the autosave settings.
	pub fn autosave(mut self, autosave: AutosaveConfig) -> Self {
		self.autosave = autosave;
		self
	}

	/// Replace the upload policy.
	pub fn upload(mut self, upload: UploadPolicy) -> Self {
		self.upload = upload;
		self
	}

	/// Set the save acknowledgement deadline.
	pub fn save_timeout(mut self, timeout: Duration) -> Self {
		self.save.timeout_ms = millis(timeout);
		self
	}

	/// Enable or disable `content-changed` streaming.
	pub fn live_sync(mut self, enabled: bool) -> Self {
		self.live_sync = enabled;
		self
	}
}

/// When and how autosave runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
	/// Whether autosave starts enabled.
	pub enabled: bool,
	/// Whether the user may switch autosave on and off.
	pub toggleable: bool,
	/// Evaluate an autosave when the change debounce elapses.
	pub save_on_change: bool,
	/// Quiet period after the last change.
	pub debounce_ms: u64,
	/// Period of the independent autosave tick.
	pub interval_ms: u64,
}

impl Default for AutosaveConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			toggleable: false,
			save_on_change: true,
			debounce_ms: 5_000,
			interval_ms: 30_000,
		}
	}
}

impl AutosaveConfig {
	/// Quiet period after the last change.
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	/// Period of the autosave tick.
	pub fn interval(&self) -> Duration {
		Duration::from_millis(self.interval_ms)
	}

	/// Set the quiet period.
	pub fn with_debounce(mut self, debounce: Duration) -> Self {
		self.debounce_ms = millis(debounce);
		self
	}

	/// Set the tick period.
	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval_ms = millis(interval);
		self
	}
}

/// Validation rules and deadlines for image uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadPolicy {
	/// Largest accepted file, in bytes.
	pub max_bytes: u64,
	/// Accepted MIME types for direct uploads.
	pub allowed_types: Vec<String>,
	/// Hosts whose URLs are accepted regardless of extension. Subdomains match.
	pub trusted_domains: Vec<String>,
	/// Path extensions recognised as images, without the dot.
	pub image_extensions: Vec<String>,
	/// Deadline for host-mediated uploads.
	pub url_timeout_ms: u64,
}

impl Default for UploadPolicy {
	fn default() -> Self {
		Self {
			max_bytes: 10 * 1024 * 1024,
			allowed_types: strings(&["image/jpeg", "image/png", "image/gif", "image/webp", "image/svg+xml"]),
			trusted_domains: strings(&["imgur.com", "unsplash.com", "picsum.photos"]),
			image_extensions: strings(&["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"]),
			url_timeout_ms: 30_000,
		}
	}
}

impl UploadPolicy {
	/// Deadline for host-mediated uploads.
	pub fn url_timeout(&self) -> Duration {
		Duration::from_millis(self.url_timeout_ms)
	}

	/// Set the largest accepted file.
	pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
		self.max_bytes = max_bytes;
		self
	}

	/// Set the host-mediated upload deadline.
	pub fn with_url_timeout(mut self, timeout: Duration) -> Self {
		self.url_timeout_ms = millis(timeout);
		self
	}
}

/// Manual save settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
	/// How long a save may wait for `content-saved` or `save-error`.
	pub timeout_ms: u64,
}

impl Default for SaveConfig {
	fn default() -> Self {
		Self { timeout_ms: 30_000 }
	}
}

impl SaveConfig {
	/// Save acknowledgement deadline.
	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}
}

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| (*s).to_string()).collect()
}

fn millis(duration: Duration) -> u64 {
	u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
