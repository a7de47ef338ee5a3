use serde::{Deserialize, Serialize};

pub mod file_path;
pub mod object;
pub mod state;
mod utils;

pub use self::{file_path::*, object::*, utils::*};

/// One predicate of the composed query sent to the search service.
/// Top level clauses are combined with AND semantics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SearchFilterArgs {
	FilePath(FilePathFilterArgs),
	Object(ObjectFilterArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
	FilePath,
	Object,
}

impl SearchFilterArgs {
	pub const fn target(&self) -> FilterTarget {
		match self {
			Self::FilePath(_) => FilterTarget::FilePath,
			Self::Object(_) => FilterTarget::Object,
		}
	}

	pub fn is_noop(&self) -> bool {
		match self {
			Self::FilePath(v) => v.is_noop(),
			Self::Object(v) => v.is_noop(),
		}
	}
}

impl From<FilePathFilterArgs> for SearchFilterArgs {
	fn from(value: FilePathFilterArgs) -> Self {
		Self::FilePath(value)
	}
}

impl From<ObjectFilterArgs> for SearchFilterArgs {
	fn from(value: ObjectFilterArgs) -> Self {
		Self::Object(value)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn filter_clauses_use_the_wire_shape() {
		let clause = SearchFilterArgs::FilePath(FilePathFilterArgs::Locations(InOrNotIn::In(
			vec![1],
		)));
		assert_eq!(
			serde_json::to_value(&clause).unwrap(),
			json!({ "filePath": { "locations": { "in": [1] } } })
		);

		let clause = SearchFilterArgs::FilePath(FilePathFilterArgs::Path {
			location_id: 1,
			path: "/Photos".into(),
			include_descendants: false,
		});
		assert_eq!(
			serde_json::to_value(&clause).unwrap(),
			json!({
				"filePath": {
					"path": { "location_id": 1, "path": "/Photos", "include_descendants": false }
				}
			})
		);

		let clause = SearchFilterArgs::Object(ObjectFilterArgs::Tags(InOrNotIn::In(vec![4])));
		assert_eq!(
			serde_json::to_value(&clause).unwrap(),
			json!({ "object": { "tags": { "in": [4] } } })
		);
		assert_eq!(clause.target(), FilterTarget::Object);
	}

	#[test]
	fn orderings_are_tagged_by_field() {
		assert_eq!(
			serde_json::to_value(FilePathOrder::Name(SortOrder::Asc)).unwrap(),
			json!({ "field": "name", "value": "Asc" })
		);
		assert_eq!(
			serde_json::to_value(FilePathOrder::Object(Box::new(ObjectOrder::Kind(
				SortOrder::Desc
			))))
			.unwrap(),
			json!({ "field": "object", "value": { "field": "kind", "value": "Desc" } })
		);
	}

	#[test]
	fn empty_membership_is_noop() {
		assert!(
			SearchFilterArgs::Object(ObjectFilterArgs::Kind(InOrNotIn::NotIn(vec![]))).is_noop()
		);
		assert!(!SearchFilterArgs::FilePath(FilePathFilterArgs::Hidden(false)).is_noop());
	}
}
