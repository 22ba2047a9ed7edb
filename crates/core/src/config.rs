//! Coordinator configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tandem_primitives::PROBLEM_CHANNEL;

/// Errors loading a [`CoreConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The file could not be read.
	#[error("failed to read config: {0}")]
	Io(#[from] std::io::Error),
	/// The file is not valid TOML for this schema.
	#[error("failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Tunables for the coordination layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
	/// Source tag passed to the pad engine for style changesets.
	pub style_source: String,
	/// Channel compiler problems are published under.
	pub problem_channel: String,
	/// Drop problem and style results computed for an outdated revision.
	pub discard_stale_results: bool,
	/// Capacity of the analysis event queue.
	pub event_queue_capacity: usize,
	/// Seconds a single test run may take before it counts as incomplete.
	pub test_run_timeout_secs: u64,
}

impl Default for CoreConfig {
	fn default() -> Self {
		Self {
			style_source: default_style_source(),
			problem_channel: PROBLEM_CHANNEL.to_string(),
			discard_stale_results: true,
			event_queue_capacity: 256,
			test_run_timeout_secs: 60,
		}
	}
}

fn default_style_source() -> String {
	"#syntaxcolor".to_string()
}

impl CoreConfig {
	/// Parses a TOML document; missing keys take their defaults.
	pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(src)?)
	}

	/// Reads and parses a TOML file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let src = std::fs::read_to_string(path)?;
		Self::from_toml_str(&src)
	}

	/// Test run timeout as a [`Duration`].
	pub fn test_run_timeout(&self) -> Duration {
		Duration::from_secs(self.test_run_timeout_secs)
	}
}
