use std::path::{Path, PathBuf};
use std::time::Duration;

use clantag_worker::HandoffPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Capability name the tag API is announced under.
pub const DEFAULT_CAPABILITY: &str = "CLANTAG_API";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TagsConfig {
	/// Name other plugins look the API up by.
	pub capability: String,
	pub display: DisplayConfig,
}

impl Default for TagsConfig {
	fn default() -> Self {
		Self {
			capability: DEFAULT_CAPABILITY.to_owned(),
			display: DisplayConfig::default(),
		}
	}
}

impl TagsConfig {
	/// Parses configuration from TOML text.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		toml::from_str(source).map_err(|error| ConfigError::Parse {
			path: PathBuf::from("<inline>"),
			error,
		})
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = toml::from_str(&source).map_err(|error| ConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		tracing::debug!(path = %path.display(), "tags.config.loaded");
		Ok(config)
	}
}

/// How resolved tags reach the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
	pub policy: DisplayPolicy,
	/// Tick period of the engine-side pump, in milliseconds.
	pub tick_interval_ms: u64,
}

impl Default for DisplayConfig {
	fn default() -> Self {
		Self {
			policy: DisplayPolicy::default(),
			tick_interval_ms: 16,
		}
	}
}

impl DisplayConfig {
	/// Tick period, never shorter than one millisecond.
	pub fn tick_interval(&self) -> Duration {
		Duration::from_millis(self.tick_interval_ms.max(1))
	}

	pub fn handoff_policy(&self) -> HandoffPolicy {
		match self.policy {
			DisplayPolicy::Fifo => HandoffPolicy::Fifo,
			DisplayPolicy::LatestPerSubject => HandoffPolicy::LatestPerKey,
		}
	}
}

/// Queueing of display updates between ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayPolicy {
	/// Apply every update in order.
	#[default]
	Fifo,
	/// Apply only the newest pending update per subject.
	LatestPerSubject,
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn empty_source_yields_defaults() {
		let config = TagsConfig::from_toml_str("").unwrap();
		assert_eq!(config, TagsConfig::default());
		assert_eq!(config.capability, "CLANTAG_API");
		assert_eq!(config.display.handoff_policy(), HandoffPolicy::Fifo);
		assert_eq!(config.display.tick_interval(), Duration::from_millis(16));
	}

	#[test]
	fn parses_display_section() {
		let config = TagsConfig::from_toml_str(
			r#"
capability = "TAGS"

[display]
policy = "latest-per-subject"
tick_interval_ms = 50
"#,
		)
		.unwrap();

		assert_eq!(config.capability, "TAGS");
		assert_eq!(config.display.policy, DisplayPolicy::LatestPerSubject);
		assert_eq!(config.display.handoff_policy(), HandoffPolicy::LatestPerKey);
		assert_eq!(config.display.tick_interval(), Duration::from_millis(50));
	}

	#[test]
	fn zero_interval_is_clamped() {
		let config = TagsConfig::from_toml_str("[display]\ntick_interval_ms = 0\n").unwrap();
		assert_eq!(config.display.tick_interval(), Duration::from_millis(1));
	}

	#[test]
	fn rejects_unknown_keys() {
		let err = TagsConfig::from_toml_str("[display]\npolcy = \"fifo\"\n").unwrap_err();
		assert!(matches!(err, ConfigError::Parse { .. }), "got {err:?}");
	}

	#[test]
	fn load_reports_missing_file_path() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing.toml");
		let err = TagsConfig::load(&path).unwrap_err();
		match err {
			ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
			other => panic!("expected Io error, got {other:?}"),
		}
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[display]\npolicy = \"fifo\"\ntick_interval_ms = 8").unwrap();
		let config = TagsConfig::load(file.path()).unwrap();
		assert_eq!(config.display.tick_interval(), Duration::from_millis(8));
	}
}
