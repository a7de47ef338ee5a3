use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Range<T> {
	From(T),
	To(T),
}

impl<T: PartialOrd> Range<T> {
	pub fn contains(&self, value: &T) -> bool {
		match self {
			Self::From(from) => value >= from,
			Self::To(to) => value <= to,
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum SortOrder {
	Asc,
	Desc,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InOrNotIn<T> {
	In(Vec<T>),
	NotIn(Vec<T>),
}

impl<T> InOrNotIn<T> {
	pub fn is_empty(&self) -> bool {
		match self {
			Self::In(v) | Self::NotIn(v) => v.is_empty(),
		}
	}
}

impl<T: PartialEq> InOrNotIn<T> {
	pub fn matches(&self, value: &T) -> bool {
		match self {
			Self::In(v) => v.contains(value),
			Self::NotIn(v) => !v.contains(value),
		}
	}
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TextMatch {
	Contains(String),
	StartsWith(String),
	EndsWith(String),
	Equals(String),
}

impl TextMatch {
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Contains(v) | Self::StartsWith(v) | Self::EndsWith(v) | Self::Equals(v) => {
				v.is_empty()
			}
		}
	}

	pub fn matches(&self, value: &str) -> bool {
		match self {
			Self::Contains(v) => value.contains(v.as_str()),
			Self::StartsWith(v) => value.starts_with(v.as_str()),
			Self::EndsWith(v) => value.ends_with(v.as_str()),
			Self::Equals(v) => value == v,
		}
	}
}
