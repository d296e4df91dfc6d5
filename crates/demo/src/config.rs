//! Demo configuration file.

use std::path::{Path, PathBuf};

use picklist_bloggers::StoreConfig;
use picklist_select::{ConfigError, SelectConfig};
use serde::Deserialize;
use thiserror::Error;

/// Contents of the `--config` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
	pub select: SelectConfig,
	pub store: StoreConfig,
}

#[derive(Debug, Error)]
pub enum DemoConfigError {
	#[error("I/O error reading {path}: {error}")]
	Io { path: PathBuf, error: std::io::Error },

	#[error("TOML parse error in {path}: {error}")]
	Parse { path: PathBuf, error: toml::de::Error },

	#[error("invalid select config: {0}")]
	Invalid(#[from] ConfigError),
}

impl DemoConfig {
	/// Reads `path`, or returns the defaults when no file is given.
	pub fn load(path: Option<&Path>) -> Result<Self, DemoConfigError> {
		let Some(path) = path else {
			return Ok(Self::default());
		};
		let text = std::fs::read_to_string(path).map_err(|error| DemoConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config: Self = toml::from_str(&text).map_err(|error| DemoConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		config.select.validate()?;
		Ok(config)
	}
}
