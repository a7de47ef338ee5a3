use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
	object::ObjectOrder,
	utils::{InOrNotIn, Range, SortOrder, TextMatch},
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum FilePathOrder {
	Name(SortOrder),
	SizeInBytes(SortOrder),
	DateCreated(SortOrder),
	DateModified(SortOrder),
	DateIndexed(SortOrder),
	Object(Box<ObjectOrder>),
}

impl FilePathOrder {
	pub fn get_sort_order(&self) -> SortOrder {
		match self {
			Self::Name(v)
			| Self::SizeInBytes(v)
			| Self::DateCreated(v)
			| Self::DateModified(v)
			| Self::DateIndexed(v) => *v,
			Self::Object(v) => v.get_sort_order(),
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FilePathFilterArgs {
	Locations(InOrNotIn<i32>),
	Path {
		location_id: i32,
		path: String,
		include_descendants: bool,
	},
	Name(TextMatch),
	Extension(InOrNotIn<String>),
	CreatedAt(Range<DateTime<Utc>>),
	ModifiedAt(Range<DateTime<Utc>>),
	IndexedAt(Range<DateTime<Utc>>),
	Hidden(bool),
}

impl FilePathFilterArgs {
	/// Membership and text clauses with nothing to match don't constrain anything.
	pub fn is_noop(&self) -> bool {
		match self {
			Self::Locations(v) => v.is_empty(),
			Self::Extension(v) => v.is_empty(),
			Self::Name(v) => v.is_empty(),
			Self::Path { .. }
			| Self::CreatedAt(_)
			| Self::ModifiedAt(_)
			| Self::IndexedAt(_)
			| Self::Hidden(_) => false,
		}
	}
}
