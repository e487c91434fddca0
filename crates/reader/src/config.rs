//! Reader configuration loaded from TOML.
//!
//! ```toml
//! duplicate_policy = "first_wins"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::strategy::{DuplicatePolicy, StrategyConflict};

/// Settings applied when a [`Registry`](crate::Registry) builds its strategy table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
	/// How conflicting `inventory` strategies for one type are merged.
	pub duplicate_policy: DuplicatePolicy,
}

impl ReaderConfig {
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&content)
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid reader config: {0}")]
	Parse(#[from] toml::de::Error),

	#[error(transparent)]
	Strategy(#[from] StrategyConflict),

	#[error("global registry already initialized")]
	GlobalAlreadyInitialized,
}
