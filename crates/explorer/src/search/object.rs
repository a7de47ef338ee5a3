use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::utils::{InOrNotIn, Range, SortOrder};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "field", content = "value")]
pub enum ObjectOrder {
	DateAccessed(SortOrder),
	Kind(SortOrder),
}

impl ObjectOrder {
	pub const fn get_sort_order(&self) -> SortOrder {
		match self {
			Self::DateAccessed(v) | Self::Kind(v) => *v,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ObjectHiddenFilter {
	#[default]
	Exclude,
	Include,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ObjectFilterArgs {
	Favorite(bool),
	Hidden(ObjectHiddenFilter),
	Kind(InOrNotIn<i32>),
	Tags(InOrNotIn<i32>),
	Labels(InOrNotIn<i32>),
	DateAccessed(Range<DateTime<Utc>>),
}

impl ObjectFilterArgs {
	/// Membership clauses with an empty set don't constrain anything.
	pub fn is_noop(&self) -> bool {
		match self {
			Self::Kind(v) | Self::Tags(v) | Self::Labels(v) => v.is_empty(),
			Self::Hidden(ObjectHiddenFilter::Include) => true,
			Self::Favorite(_) | Self::Hidden(ObjectHiddenFilter::Exclude) | Self::DateAccessed(_) => {
				false
			}
		}
	}
}
