use std::{fmt::Display, path::Path};

use thiserror::Error;

use crate::{cache::CacheError, entity::EntityRef};

/// Route parameters failed their schema. Fatal to the route render.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
	#[error("missing route parameter: {0}")]
	MissingParam(&'static str),
	#[error("route parameter <name='{name}'> is not a valid id: '{value}'")]
	InvalidId { name: &'static str, value: String },
	#[error("route parameter <name='{name}'> must be positive, got {value}")]
	NonPositiveId { name: &'static str, value: i64 },
	#[error("invalid search parameter <name='{name}'>: '{value}'")]
	InvalidSearchParam { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum PersistError {
	#[error("preference value encode error: {0}")]
	Encode(#[from] rmp_serde::encode::Error),
	#[error("preference value decode error <key='{key}'>: {source}")]
	Decode {
		key: String,
		#[source]
		source: rmp_serde::decode::Error,
	},
	#[error("preference store write failed: {0}")]
	Store(String),
	#[error("settings committer for {0} is shut down")]
	CommitterClosed(EntityRef),
}

/// Fetch failures. All of them are retryable from the view.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
	#[error("transport error: {0}")]
	Transport(String),
	#[error("not found: {0}")]
	NotFound(String),
	#[error("invalid query: {0}")]
	Validation(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
	#[error("failed to subscribe to '{name}': {reason}")]
	Subscribe { name: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error(transparent)]
	FileIO(#[from] FileIOError),
	#[error("config json error: {0}")]
	Json(#[from] serde_json::Error),
	#[error("config version {found} is newer than supported version {supported}")]
	UnsupportedVersion { found: u32, supported: u32 },
}

#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	#[error(transparent)]
	Persist(#[from] PersistError),
	#[error(transparent)]
	Query(#[from] QueryError),
	#[error(transparent)]
	Subscription(#[from] SubscriptionError),
	#[error(transparent)]
	Config(#[from] ConfigError),
	#[error(transparent)]
	Cache(#[from] CacheError),
}

impl Error {
	/// Only route level errors escape to the outer error boundary, everything else renders inline.
	#[must_use]
	pub const fn is_fatal(&self) -> bool {
		matches!(self, Self::Validation(_))
	}
}

/// File I/O error that includes the path that caused the error
#[derive(Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: std::io::Error,
	pub maybe_context: Option<&'static str>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"file I/O error{}: {}; path: '{}'",
			self.maybe_context
				.map(|ctx| format!(" ({ctx})"))
				.unwrap_or_default(),
			self.source,
			self.path.display()
		)
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error)> for FileIOError {
	fn from((path, source): (P, std::io::Error)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}
}

impl<P: AsRef<Path>> From<(P, std::io::Error, &'static str)> for FileIOError {
	fn from((path, source, context): (P, std::io::Error, &'static str)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(context),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_validation_errors_are_fatal() {
		assert!(Error::from(ValidationError::MissingParam("id")).is_fatal());
		assert!(!Error::from(QueryError::Transport("offline".into())).is_fatal());
		assert!(!Error::from(SubscriptionError::Subscribe {
			name: "locations.quickRescan",
			reason: "not connected".into(),
		})
		.is_fatal());
		assert!(!Error::from(PersistError::Store("disk full".into())).is_fatal());
	}

	#[test]
	fn file_io_error_mentions_path_and_context() {
		let err = FileIOError::from((
			"/tmp/explorer.json",
			std::io::Error::from(std::io::ErrorKind::NotFound),
			"Failed to read config",
		));

		let message = err.to_string();
		assert!(message.contains("(Failed to read config)"));
		assert!(message.contains("/tmp/explorer.json"));
	}
}
