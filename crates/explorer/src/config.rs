use std::{
	path::{Path, PathBuf},
	time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

use crate::error::{ConfigError, FileIOError};

/// Most items a single page may request from the search service.
pub const MAX_TAKE: u8 = 100;

const CONFIG_FILE_NAME: &str = "explorer.json";

/// Runtime knobs of the explorer views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExplorerConfig {
	/// Config schema version
	pub version: u32,

	/// Items requested per page when the route doesn't ask for a size
	#[serde(default = "default_page_size")]
	pub page_size: u8,

	/// Quiet period before a burst of settings edits is written back
	#[serde(default = "default_persist_debounce_ms")]
	pub persist_debounce_ms: u64,

	/// Keep showing the previous listing while a same-view refetch is in flight
	#[serde(default = "default_true")]
	pub keep_previous_data: bool,

	/// List directories before files in location views
	#[serde(default = "default_true")]
	pub group_directories: bool,
}

const fn default_page_size() -> u8 {
	MAX_TAKE
}

const fn default_persist_debounce_ms() -> u64 {
	300
}

const fn default_true() -> bool {
	true
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			version: Self::target_version(),
			page_size: default_page_size(),
			persist_debounce_ms: default_persist_debounce_ms(),
			keep_previous_data: true,
			group_directories: true,
		}
	}
}

impl ExplorerConfig {
	pub const fn target_version() -> u32 {
		1
	}

	pub const fn persist_debounce(&self) -> Duration {
		Duration::from_millis(self.persist_debounce_ms)
	}

	pub fn clamp_take(&self, take: u8) -> u8 {
		take.clamp(1, MAX_TAKE)
	}

	pub fn path(data_dir: impl AsRef<Path>) -> PathBuf {
		data_dir.as_ref().join(CONFIG_FILE_NAME)
	}

	/// Loads the config from `data_dir`, writing the defaults there if there's none yet.
	pub async fn load_from(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let config_path = Self::path(&data_dir);

		match fs::read(&config_path).await {
			Ok(bytes) => {
				info!(?config_path, "Loading explorer config");

				let config = serde_json::from_slice::<Self>(&bytes)?;

				if config.version > Self::target_version() {
					return Err(ConfigError::UnsupportedVersion {
						found: config.version,
						supported: Self::target_version(),
					});
				}

				Ok(config)
			}
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				warn!(?config_path, "No explorer config found, creating default");

				let config = Self::default();
				config.save(data_dir).await?;

				Ok(config)
			}
			Err(e) => {
				Err(FileIOError::from((config_path, e, "Failed to read explorer config")).into())
			}
		}
	}

	pub async fn save(&self, data_dir: impl AsRef<Path>) -> Result<(), ConfigError> {
		let data_dir = data_dir.as_ref();

		fs::create_dir_all(data_dir)
			.await
			.map_err(|e| FileIOError::from((data_dir, e, "Failed to create config directory")))?;

		let config_path = Self::path(data_dir);

		fs::write(&config_path, serde_json::to_vec_pretty(self)?)
			.await
			.map_err(|e| FileIOError::from((&config_path, e, "Failed to write explorer config")))?;

		info!(?config_path, "Saved explorer config");

		Ok(())
	}
}
