use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{config::MAX_TAKE, error::ValidationError};

/// `{ id }` parameter of `/location/:id` and `/tag/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIdParams {
	pub id: i32,
}

impl EntityIdParams {
	pub fn parse(params: &HashMap<String, String>) -> Result<Self, ValidationError> {
		let raw = params
			.get("id")
			.ok_or(ValidationError::MissingParam("id"))?;

		let id = raw
			.trim()
			.parse::<i64>()
			.map_err(|_| ValidationError::InvalidId {
				name: "id",
				value: raw.clone(),
			})?;

		if id <= 0 {
			return Err(ValidationError::NonPositiveId { name: "id", value: id });
		}

		i32::try_from(id)
			.map(|id| Self { id })
			.map_err(|_| ValidationError::InvalidId {
				name: "id",
				value: raw.clone(),
			})
	}
}

/// Navigational state encoded in the explorer's search params.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteState {
	/// Sub-path inside a location, `None` for the location root.
	pub path: Option<String>,
	/// Page size requested by the route, the configured page size is used when absent.
	pub take: Option<u8>,
}

impl RouteState {
	pub fn parse(params: &HashMap<String, String>) -> Result<Self, ValidationError> {
		let path = params.get("path").filter(|path| !path.is_empty()).cloned();

		let take = params
			.get("take")
			.map(|raw| {
				raw.trim()
					.parse::<u8>()
					.ok()
					.filter(|take| (1..=MAX_TAKE).contains(take))
					.ok_or_else(|| ValidationError::InvalidSearchParam {
						name: "take",
						value: raw.clone(),
					})
			})
			.transpose()?;

		Ok(Self { path, take })
	}

	/// Last section of the sub-path, used as the route title.
	pub fn last_section(&self) -> Option<&str> {
		let path = self.path.as_deref().filter(|path| path.len() > 1)?;

		path.strip_suffix('/')
			.unwrap_or(path)
			.rsplit('/')
			.next()
	}
}
