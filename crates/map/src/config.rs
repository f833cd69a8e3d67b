//! Map session configuration (`casemap.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{Capabilities, RenderContext};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// The file is not valid TOML or contains unknown keys.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Hit areas installed around circular safeguards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HitboxConfig {
	/// Radius of the hit polygon in meters.
	pub radius_m: f64,
	/// Vertex count of the hit polygon.
	pub steps: usize,
	/// Fill opacity of an idle hit polygon.
	pub idle_fill_opacity: f64,
}

impl Default for HitboxConfig {
	fn default() -> Self {
		Self {
			radius_m: 2.0,
			steps: 32,
			idle_fill_opacity: 0.03,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
	/// Prefix prepended to icon paths from element styles.
	pub asset_root: String,
	pub notification_timeout_ms: u64,
	pub icon_size: [u32; 2],
	/// Move the camera onto the last active element once an import has flushed.
	pub focus_after_import: bool,
	pub hitbox: HitboxConfig,
}

impl Default for MapConfig {
	fn default() -> Self {
		Self {
			asset_root: String::new(),
			notification_timeout_ms: 5000,
			icon_size: [30, 30],
			focus_after_import: true,
			hitbox: HitboxConfig::default(),
		}
	}
}

impl MapConfig {
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = Self::from_toml_str(&text)?;
		tracing::debug!(path = %path.display(), "map.config.loaded");
		Ok(config)
	}

	pub fn notification_timeout(&self) -> Duration {
		Duration::from_millis(self.notification_timeout_ms)
	}

	pub(crate) fn render_context(&self, capabilities: Capabilities) -> RenderContext {
		RenderContext {
			asset_root: self.asset_root.clone(),
			icon_size: self.icon_size,
			capabilities,
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn empty_file_yields_defaults() {
		assert_eq!(MapConfig::from_toml_str("").unwrap(), MapConfig::default());
	}

	#[test]
	fn partial_hitbox_table_keeps_other_defaults() {
		let config = MapConfig::from_toml_str("asset_root = \"https://cdn\"\n[hitbox]\nradius_m = 3.5\n").unwrap();
		assert_eq!(config.asset_root, "https://cdn");
		assert_eq!(config.hitbox.radius_m, 3.5);
		assert_eq!(config.hitbox.steps, 32);
		assert_eq!(config.notification_timeout(), Duration::from_secs(5));
	}

	#[test]
	fn unknown_keys_are_rejected() {
		assert!(matches!(MapConfig::from_toml_str("zoom = 3"), Err(ConfigError::Parse(_))));
		assert!(matches!(MapConfig::from_toml_str("[hitbox]\nsize = 1"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn load_reports_path_on_io_error() {
		let dir = tempfile::tempdir().unwrap();
		let missing = dir.path().join("missing.toml");
		let err = MapConfig::load(&missing).unwrap_err();
		assert!(matches!(err, ConfigError::Io { path, .. } if path == missing));
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "focus_after_import = false").unwrap();
		let config = MapConfig::load(file.path()).unwrap();
		assert!(!config.focus_after_import);
	}
}
